use std::time::Instant;

use serde::Serialize;

use crate::archive::{ScratchDir, fetch_archive_text};
use crate::config::ResolvedConfig;
use crate::domain::FundRecord;
use crate::error::CvmError;
use crate::index::IndexResolver;
use crate::query::select_latest;
use crate::records::parse_report;
use crate::transport::{CvmTransport, HttpTransport};

#[derive(Debug, Clone, Serialize)]
pub struct DailyInfo {
    pub source_url: String,
    pub fetched_at: String,
    pub records: Vec<FundRecord>,
}

#[derive(Clone)]
pub struct DailyInfoService<T: CvmTransport> {
    transport: T,
    config: ResolvedConfig,
    scratch: ScratchDir,
}

impl DailyInfoService<HttpTransport> {
    pub fn from_config(config: ResolvedConfig) -> Result<Self, CvmError> {
        let transport = HttpTransport::new(config.timeout())?;
        let scratch = ScratchDir::resolve(config.scratch_dir.as_deref())?;
        Ok(Self::new(transport, config, scratch))
    }
}

impl<T: CvmTransport> DailyInfoService<T> {
    pub fn new(transport: T, config: ResolvedConfig, scratch: ScratchDir) -> Self {
        Self {
            transport,
            config,
            scratch,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get_daily_info<S: AsRef<str>>(&self, cnpjs: &[S]) -> Result<Vec<FundRecord>, CvmError> {
        Ok(self.fetch_daily_info(cnpjs)?.records)
    }

    pub fn get_daily_info_for(&self, cnpj: &str) -> Result<Vec<FundRecord>, CvmError> {
        self.get_daily_info(&[cnpj])
    }

    pub fn get_all_daily_info(&self) -> Result<Vec<FundRecord>, CvmError> {
        let none: [&str; 0] = [];
        self.get_daily_info(&none)
    }

    pub fn fetch_daily_info<S: AsRef<str>>(&self, cnpjs: &[S]) -> Result<DailyInfo, CvmError> {
        let start = Instant::now();
        let source_url = IndexResolver::new(
            &self.transport,
            &self.config.daily_info_url,
            &self.config.index_selector,
        )
        .resolve()?;

        let text = fetch_archive_text(&self.transport, &source_url, &self.scratch)?;
        let report = parse_report(&text);
        let records = select_latest(&report.records, cnpjs);

        tracing::info!(
            source = %source_url,
            parsed = report.records.len(),
            returned = records.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "daily info resolved"
        );

        Ok(DailyInfo {
            source_url,
            fetched_at: chrono::Utc::now().to_rfc3339(),
            records,
        })
    }
}
