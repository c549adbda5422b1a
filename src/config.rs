use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::CvmError;

pub const CONFIG_FILE_NAME: &str = "cvm-quota.json";
pub const DEFAULT_INDEX_SELECTOR: &str = "body > div.wrapper > pre";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_FUNDS_URL: &str = "CVM_FUNDS_URL";
pub const ENV_DAILY_INFO_URL: &str = "CVM_DAILY_INFO_URL";
pub const ENV_SCRATCH_DIR: &str = "CVM_SCRATCH_DIR";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub funds_url: Option<String>,
    #[serde(default)]
    pub daily_info_url: Option<String>,
    #[serde(default)]
    pub index_selector: Option<String>,
    #[serde(default)]
    pub scratch_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub funds_url: Option<String>,
    pub daily_info_url: String,
    pub index_selector: String,
    pub scratch_dir: Option<Utf8PathBuf>,
    pub timeout_secs: u64,
}

impl ResolvedConfig {
    pub fn new(daily_info_url: &str) -> Self {
        Self {
            funds_url: None,
            daily_info_url: daily_info_url.trim().to_string(),
            index_selector: DEFAULT_INDEX_SELECTOR.to_string(),
            scratch_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn require_funds_url(&self) -> Result<&str, CvmError> {
        self.funds_url
            .as_deref()
            .ok_or_else(|| CvmError::MissingConfig("funds_url".to_string()))
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, CvmError> {
        let mut config = match Self::locate(path)? {
            Some(config_path) => {
                let content = fs::read_to_string(&config_path)
                    .map_err(|_| CvmError::ConfigRead(config_path.clone()))?;
                serde_json::from_str(&content)
                    .map_err(|err| CvmError::ConfigParse(err.to_string()))?
            }
            None => Config::default(),
        };

        if let Some(value) = env_value(ENV_FUNDS_URL) {
            config.funds_url = Some(value);
        }
        if let Some(value) = env_value(ENV_DAILY_INFO_URL) {
            config.daily_info_url = Some(value);
        }
        if let Some(value) = env_value(ENV_SCRATCH_DIR) {
            config.scratch_dir = Some(Utf8PathBuf::from(value));
        }

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, CvmError> {
        let daily_info_url = config
            .daily_info_url
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| CvmError::MissingConfig("daily_info_url".to_string()))?;

        Ok(ResolvedConfig {
            funds_url: config
                .funds_url
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            daily_info_url: daily_info_url.trim().to_string(),
            index_selector: config
                .index_selector
                .unwrap_or_else(|| DEFAULT_INDEX_SELECTOR.to_string()),
            scratch_dir: config.scratch_dir,
            timeout_secs: config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    fn locate(path: Option<&str>) -> Result<Option<PathBuf>, CvmError> {
        if let Some(path) = path {
            let explicit = PathBuf::from(path);
            if !explicit.exists() {
                return Err(CvmError::ConfigRead(explicit));
            }
            return Ok(Some(explicit));
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Ok(Some(local));
        }

        Ok(ProjectDirs::from("br", "cvm", "cvm-quota")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .filter(|candidate| candidate.exists()))
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
