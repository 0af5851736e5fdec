//! Lookup service composing the cache, refresh coordinator and fetcher

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::version::cache::{CacheStatus, VersionStorer};
use crate::version::error::LookupError;
use crate::version::fetcher::Fetcher;
use crate::version::refresh::{RefreshDecision, ensure_fresh};
use crate::version::types::CacheKey;
use crate::version::warmup::{WarmUpReport, warm_up};

pub struct VersionService<S: VersionStorer> {
    storer: Arc<S>,
    fetcher: Arc<dyn Fetcher>,
    keys: Vec<CacheKey>,
}

impl<S: VersionStorer> VersionService<S> {
    /// Build a service over the given key space
    pub fn new(storer: Arc<S>, fetcher: Arc<dyn Fetcher>, keys: Vec<CacheKey>) -> Self {
        Self {
            storer,
            fetcher,
            keys,
        }
    }

    pub fn storer(&self) -> &Arc<S> {
        &self.storer
    }

    pub fn keys(&self) -> &[CacheKey] {
        &self.keys
    }

    /// Return the version for a key
    ///
    /// A cached value (fresh or stale) is returned immediately; stale values
    /// trigger a background refresh. Only a cache miss waits on the fetcher,
    /// and only a failed miss fetch is reported to the caller.
    pub async fn lookup(&self, key: CacheKey) -> Result<String, LookupError> {
        if let Some(entry) = self.storer.get(key)? {
            match ensure_fresh(&self.storer, &self.fetcher, key) {
                Ok(RefreshDecision::Fresh) => debug!("Cache hit for {}", key),
                Ok(RefreshDecision::AlreadyInFlight) => {
                    debug!("Cache hit for {} (stale, refresh in flight)", key)
                }
                Ok(RefreshDecision::Spawned(_)) => {
                    debug!("Cache hit for {} (stale, refresh started)", key)
                }
                Err(e) => error!("Failed to check freshness of {}: {}", key, e),
            }
            return Ok(entry.version);
        }

        info!("Cache miss for {}, fetching", key);
        let version = self.fetcher.fetch_latest(key).await?;
        self.storer.put(key, version.clone())?;
        Ok(version)
    }

    /// Cache state of every key in the configured key space
    pub fn status(&self) -> Result<CacheStatus, LookupError> {
        Ok(self.storer.status(&self.keys)?)
    }

    /// Populate every key in the configured key space
    pub async fn warm_up(&self) -> WarmUpReport {
        warm_up(&*self.storer, &*self.fetcher, &self.keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::cache::Cache;
    use crate::version::error::FetchError;
    use crate::version::fetcher::MockFetcher;
    use crate::version::types::{Channel, Platform};

    const DAY_MS: i64 = 86_400_000;

    fn key() -> CacheKey {
        CacheKey::new(Platform::Linux, Channel::Preview)
    }

    fn service(ttl_ms: i64, fetcher: MockFetcher) -> VersionService<Cache> {
        VersionService::new(
            Arc::new(Cache::new(ttl_ms)),
            Arc::new(fetcher),
            CacheKey::all(),
        )
    }

    #[tokio::test]
    async fn lookup_fetches_synchronously_on_miss() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_latest()
            .withf(|k| *k == key())
            .times(1)
            .returning(|_| Ok("1.0.0.0".to_string()));
        let service = service(DAY_MS, fetcher);

        let version = service.lookup(key()).await.unwrap();

        assert_eq!(version, "1.0.0.0");
        let status = service.status().unwrap();
        let entry = status
            .entries
            .iter()
            .find(|e| e.platform == Platform::Linux && e.channel == Channel::Preview)
            .unwrap();
        assert!(entry.cached);
        assert_eq!(entry.version.as_deref(), Some("1.0.0.0"));
    }

    #[tokio::test]
    async fn lookup_serves_fresh_entry_without_fetching() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch_latest().times(0);
        let service = service(DAY_MS, fetcher);
        service.storer().put(key(), "1.0.0.0".to_string()).unwrap();

        assert_eq!(service.lookup(key()).await.unwrap(), "1.0.0.0");
    }

    #[tokio::test]
    async fn lookup_propagates_failure_on_miss() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_latest()
            .times(1)
            .returning(|_| Err(FetchError::Timeout(30_000)));
        let service = service(DAY_MS, fetcher);

        let result = service.lookup(key()).await;

        assert!(matches!(
            result,
            Err(LookupError::SourceUnavailable(FetchError::Timeout(_)))
        ));
        assert!(!service.status().unwrap().entries.iter().any(|e| e.cached));
    }

    #[tokio::test]
    async fn lookup_returns_stale_value_while_refresh_is_claimed() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch_latest().times(0);
        let service = service(0, fetcher);
        service.storer().put(key(), "1.0.0.0".to_string()).unwrap();
        assert!(service.storer().try_start_refresh(key()).unwrap());

        assert_eq!(service.lookup(key()).await.unwrap(), "1.0.0.0");
    }

    #[tokio::test]
    async fn status_covers_configured_key_space_only() {
        let fetcher = MockFetcher::new();
        let service = VersionService::new(
            Arc::new(Cache::new(DAY_MS)),
            Arc::new(fetcher),
            CacheKey::for_platforms(&[Platform::Win]),
        );

        let status = service.status().unwrap();

        assert_eq!(status.ttl_ms, DAY_MS);
        assert_eq!(status.entries.len(), 2);
        assert!(status.entries.iter().all(|e| e.platform == Platform::Win));
    }
}
