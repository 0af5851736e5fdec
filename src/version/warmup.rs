//! Startup population of the version cache

use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::FETCH_STAGGER_DELAY_MS;
use crate::version::cache::VersionStorer;
use crate::version::fetcher::Fetcher;
use crate::version::types::CacheKey;

/// Outcome of a warm-up pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WarmUpReport {
    pub warmed: Vec<CacheKey>,
    /// Keys that could not be fetched, with the error message
    pub failed: Vec<(CacheKey, String)>,
}

impl WarmUpReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetch every key concurrently and cache the results
///
/// Fetches start staggered to avoid hammering the source. A failure for one
/// key never affects the others; failed keys are simply left uncached.
pub async fn warm_up<S: VersionStorer>(
    storer: &S,
    fetcher: &dyn Fetcher,
    keys: &[CacheKey],
) -> WarmUpReport {
    info!("Warming version cache for {} keys", keys.len());

    let futures = keys.iter().copied().enumerate().map(|(i, key)| {
        let delay = Duration::from_millis(FETCH_STAGGER_DELAY_MS * i as u64);
        async move {
            sleep(delay).await;
            let result = match fetcher.fetch_latest(key).await {
                Ok(version) => storer
                    .put(key, version.clone())
                    .map(|()| version)
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            (key, result)
        }
    });

    let mut report = WarmUpReport::default();
    for (key, result) in join_all(futures).await {
        match result {
            Ok(version) => {
                info!("Warmed {} with {}", key, version);
                report.warmed.push(key);
            }
            Err(e) => {
                error!("Failed to warm {}: {}", key, e);
                report.failed.push((key, e));
            }
        }
    }

    if report.is_complete() {
        info!("Cache warm-up finished: {} keys cached", report.warmed.len());
    } else {
        warn!(
            "Cache warm-up finished with {} of {} keys uncached",
            report.failed.len(),
            keys.len()
        );
    }

    report
}
