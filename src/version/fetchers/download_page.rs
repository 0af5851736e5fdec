//! Download page scraper for dedicated server builds

use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::FetcherConfig;
use crate::version::error::FetchError;
use crate::version::fetcher::Fetcher;
use crate::version::types::CacheKey;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetcher that extracts versions from the download links on a web page
///
/// Links look like `.../bin-linux-preview/bedrock-server-1.21.50.24.zip`.
pub struct DownloadPageFetcher {
    client: reqwest::Client,
    page_url: String,
    timeout_ms: u64,
    /// `bin-<platform>[-preview]/<prefix>-<version>.zip`
    link_re: Regex,
    /// Four dot-separated numeric components
    version_re: Regex,
}

impl DownloadPageFetcher {
    pub fn new(
        page_url: &str,
        artifact_prefix: &str,
        timeout_ms: u64,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        let link_re = Regex::new(&format!(
            r#"bin-(win|linux)(-preview)?/{}-([^/"'\s]+?)\.zip"#,
            regex::escape(artifact_prefix)
        ))?;
        let version_re = Regex::new(r"^\d+\.\d+\.\d+\.\d+$")?;

        Ok(Self {
            client,
            page_url: page_url.to_string(),
            timeout_ms,
            link_re,
            version_re,
        })
    }

    pub fn from_config(config: &FetcherConfig) -> Result<Self, FetchError> {
        Self::new(&config.page_url, &config.artifact_prefix, config.timeout)
    }

    /// Find the version in the download link for `key`
    fn extract_version(&self, key: CacheKey, page: &str) -> Result<String, FetchError> {
        let raw = self
            .link_re
            .captures_iter(page)
            .find(|caps| {
                let platform = caps.get(1).map(|m| m.as_str());
                let preview = caps.get(2).is_some();
                platform == Some(key.platform.as_str()) && preview == key.channel.is_preview()
            })
            .and_then(|caps| caps.get(3))
            .map(|m| m.as_str())
            .ok_or_else(|| FetchError::LinkNotFound(key.to_string()))?;

        if !self.version_re.is_match(raw) {
            warn!("Download link for {} has unexpected version {:?}", key, raw);
            return Err(FetchError::InvalidVersion(raw.to_string()));
        }

        Ok(raw.to_string())
    }

    fn map_request_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout_ms)
        } else {
            FetchError::Network(e)
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for DownloadPageFetcher {
    async fn fetch_latest(&self, key: CacheKey) -> Result<String, FetchError> {
        debug!("Fetching {} for {}", self.page_url, key);

        let response = self
            .client
            .get(&self.page_url)
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Download page returned status {}: {}", status, self.page_url);
            return Err(FetchError::UnexpectedStatus(status.as_u16()));
        }

        let page = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.extract_version(key, &page)
    }
}
