//! Background refresh of stale cache entries

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::version::cache::VersionStorer;
use crate::version::error::CacheError;
use crate::version::fetcher::Fetcher;
use crate::version::types::CacheKey;

/// What `ensure_fresh` decided for a key
#[derive(Debug)]
pub enum RefreshDecision {
    /// Entry is within its TTL; nothing to do
    Fresh,
    /// Another task already owns the refresh for this key
    AlreadyInFlight,
    /// A refresh was claimed and spawned; resolves to true if a new version was stored
    Spawned(JoinHandle<bool>),
}

/// Fetch a key and store the result
///
/// The caller must own the refresh claim. On success `put` stores the new
/// version and releases the claim; on failure the cached version is kept and
/// the claim is released.
async fn fetch_and_store<S: VersionStorer>(
    storer: Arc<S>,
    fetcher: Arc<dyn Fetcher>,
    key: CacheKey,
) -> bool {
    match fetcher.fetch_latest(key).await {
        Ok(version) => match storer.put(key, version.clone()) {
            Ok(()) => {
                info!("Refreshed {} to {}", key, version);
                true
            }
            Err(e) => {
                error!("Failed to store refreshed version for {}: {}", key, e);
                release_claim(&*storer, key);
                false
            }
        },
        Err(e) => {
            error!(
                "Background refresh failed for {}, keeping cached version: {}",
                key, e
            );
            release_claim(&*storer, key);
            false
        }
    }
}

fn release_claim<S: VersionStorer>(storer: &S, key: CacheKey) {
    let _ = storer
        .finish_refresh(key)
        .inspect_err(|e| error!("Failed to finish refresh for {}: {}", key, e));
}

/// Make sure a key is fresh, refreshing it in the background if needed
///
/// Never waits for the fetch. Absent and stale entries are refreshed by at
/// most one task per key; concurrent callers get `AlreadyInFlight`.
/// Must be called from within a Tokio runtime.
pub fn ensure_fresh<S: VersionStorer>(
    storer: &Arc<S>,
    fetcher: &Arc<dyn Fetcher>,
    key: CacheKey,
) -> Result<RefreshDecision, CacheError> {
    if let Some(entry) = storer.get(key)? {
        if storer.is_fresh(&entry) {
            return Ok(RefreshDecision::Fresh);
        }
    }

    if !storer.try_start_refresh(key)? {
        debug!("Skipping refresh of {}: already in flight", key);
        return Ok(RefreshDecision::AlreadyInFlight);
    }

    debug!("Starting background refresh of {}", key);
    let storer = Arc::clone(storer);
    let fetcher = Arc::clone(fetcher);

    // The outer task observes the inner one so a panicking fetch still
    // releases the claim.
    let handle = tokio::spawn(async move {
        let task = tokio::spawn(fetch_and_store(Arc::clone(&storer), fetcher, key));
        match task.await {
            Ok(stored) => stored,
            Err(e) => {
                error!("Refresh task for {} aborted: {}", key, e);
                release_claim(&*storer, key);
                false
            }
        }
    });

    Ok(RefreshDecision::Spawned(handle))
}
