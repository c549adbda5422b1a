use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CvmError {
    #[error("index page is not as expected: listing container not found")]
    MalformedIndex,

    #[error("index page has no published files")]
    EmptyIndex,

    #[error("newest index entry has no link")]
    MissingLink,

    #[error("CVM request failed: {0}")]
    Fetch(String),

    #[error("CVM returned status {status}: {message}")]
    FetchStatus { status: u16, message: String },

    #[error("failed to decompress index page: {0}")]
    Decompress(String),

    #[error("failed to read archive: {0}")]
    Archive(String),

    #[error("archive has no entries")]
    EmptyArchive,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid index selector: {0}")]
    InvalidSelector(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("missing configuration value: {0}")]
    #[diagnostic(help("set it in cvm-quota.json or through the matching CVM_* environment variable"))]
    MissingConfig(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}

impl CvmError {
    pub fn is_network(&self) -> bool {
        matches!(self, CvmError::Fetch(_) | CvmError::FetchStatus { .. })
    }

    pub fn is_feed_shape(&self) -> bool {
        matches!(
            self,
            CvmError::MalformedIndex
                | CvmError::EmptyIndex
                | CvmError::MissingLink
                | CvmError::Decompress(_)
                | CvmError::Archive(_)
                | CvmError::EmptyArchive
        )
    }
}
