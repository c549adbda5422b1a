use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use cvm_quota::app::DailyInfoService;
use cvm_quota::config::ConfigLoader;
use cvm_quota::error::CvmError;
use cvm_quota::output::{JsonOutput, OutputFormat, TableOutput};

#[derive(Parser)]
#[command(name = "cvm-quota")]
#[command(about = "Latest daily quota values of Brazilian investment funds, straight from the CVM")]
#[command(version, author)]
struct Cli {
    /// Path to a cvm-quota.json config file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Look up the latest daily info for one or more CNPJs (all funds if none)")]
    Quota(QuotaArgs),
    #[command(about = "Print the resolved configuration")]
    Config,
}

#[derive(Args)]
struct QuotaArgs {
    cnpjs: Vec<String>,

    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(cvm) = report.downcast_ref::<CvmError>() {
            return ExitCode::from(map_exit_code(cvm));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &CvmError) -> u8 {
    match error {
        CvmError::MissingConfig(_) | CvmError::ConfigRead(_) | CvmError::ConfigParse(_) => 2,
        err if err.is_network() => 3,
        err if err.is_feed_shape() => 4,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => JsonOutput::print_config(&config).into_diagnostic(),
        Commands::Quota(args) => {
            let service = DailyInfoService::from_config(config)?;
            let result = service.fetch_daily_info(args.cnpjs.as_slice())?;
            if !args.cnpjs.is_empty() && result.records.len() < args.cnpjs.len() {
                tracing::warn!(
                    requested = args.cnpjs.len(),
                    found = result.records.len(),
                    "some CNPJs were not found in the latest report"
                );
            }
            match args.format {
                OutputFormat::Json => JsonOutput::print_daily_info(&result),
                OutputFormat::Table => TableOutput::print_daily_info(&result),
            }
            .into_diagnostic()
        }
    }
}
