use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::CvmError;

pub trait CvmTransport: Send + Sync {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, CvmError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, CvmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("cvm-quota/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CvmError::Fetch(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| CvmError::Fetch(err.to_string()))?;
        Ok(Self { client })
    }
}

impl CvmTransport for HttpTransport {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, CvmError> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| CvmError::Fetch(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .map(|body| truncate(&body))
                .unwrap_or_else(|_| "CVM request failed".to_string());
            return Err(CvmError::FetchStatus { status, message });
        }
        let bytes = response
            .bytes()
            .map_err(|err| CvmError::Fetch(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_bodies() {
        let body = "x".repeat(500);
        let short = truncate(&body);
        assert_eq!(short.len(), 203);
        assert!(short.ends_with("..."));
        assert_eq!(truncate("not found"), "not found");
    }
}
