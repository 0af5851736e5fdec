//! Fetcher trait for resolving the latest version from the external source

#[cfg(test)]
use mockall::automock;

use crate::version::error::FetchError;
use crate::version::types::CacheKey;

/// Trait for fetching the latest server version for a key
///
/// Implementations must be repeatable and must bound their own latency:
/// a fetch that cannot complete returns an error instead of hanging.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the latest version for a platform/channel pair
    ///
    /// # Returns
    /// * `Ok(String)` - The version token (e.g. "1.21.44.01")
    /// * `Err(FetchError)` - If the source is unreachable or the version cannot be extracted
    async fn fetch_latest(&self, key: CacheKey) -> Result<String, FetchError>;
}
