//! In-memory version cache with per-key refresh claims

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::version::error::CacheError;
use crate::version::types::{CacheKey, Channel, Platform};

/// A cached version for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub version: String,
    /// Time of the last successful fetch
    pub fetched_at: DateTime<Utc>,
    /// True while a background refresh owns this key
    pub refreshing: bool,
}

impl CacheEntry {
    /// An entry is fresh while less than `ttl_ms` has elapsed since it was fetched
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl_ms: i64) -> bool {
        (now - self.fetched_at).num_milliseconds() < ttl_ms
    }
}

/// Cache state of one key as reported by [`VersionStorer::status`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStatus {
    pub platform: Platform,
    pub channel: Channel,
    pub cached: bool,
    pub version: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Snapshot of the whole key space
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub ttl_ms: i64,
    pub entries: Vec<EntryStatus>,
}

/// Trait for storing cached versions and coordinating refresh ownership
///
/// All mutation goes through `put`, `try_start_refresh` and `finish_refresh`;
/// each is atomic per key.
pub trait VersionStorer: Send + Sync + 'static {
    /// Get the cached entry for a key, if one was ever fetched successfully
    fn get(&self, key: CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Store a freshly fetched version and release any refresh claim
    fn put(&self, key: CacheKey, version: String) -> Result<(), CacheError>;

    /// Claim the refresh for a key
    ///
    /// Returns false if another task already owns it.
    fn try_start_refresh(&self, key: CacheKey) -> Result<bool, CacheError>;

    /// Release a refresh claim without touching the cached version
    fn finish_refresh(&self, key: CacheKey) -> Result<(), CacheError>;

    /// Configured time-to-live in milliseconds
    fn ttl_ms(&self) -> i64;

    /// Whether an entry is still within its TTL
    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.is_fresh_at(Utc::now(), self.ttl_ms())
    }

    /// Report the cache state of each given key
    fn status(&self, keys: &[CacheKey]) -> Result<CacheStatus, CacheError> {
        let entries = keys
            .iter()
            .map(|&key| {
                let entry = self.get(key)?;
                Ok(EntryStatus {
                    platform: key.platform,
                    channel: key.channel,
                    cached: entry.is_some(),
                    fetched_at: entry.as_ref().map(|e| e.fetched_at),
                    version: entry.map(|e| e.version),
                })
            })
            .collect::<Result<Vec<_>, CacheError>>()?;

        Ok(CacheStatus {
            ttl_ms: self.ttl_ms(),
            entries,
        })
    }
}

/// Per-key slot; a slot may hold a refresh claim before any version exists
#[derive(Debug, Default)]
struct Slot {
    entry: Option<(String, DateTime<Utc>)>,
    refreshing: bool,
}

pub struct Cache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    ttl_ms: i64,
}

impl Cache {
    pub fn new(ttl_ms: i64) -> Self {
        info!("Initializing in-memory version cache (ttl {} ms)", ttl_ms);
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl_ms,
        }
    }

    /// Acquire the slot map lock with proper error handling
    fn lock_slots(&self) -> Result<MutexGuard<'_, HashMap<CacheKey, Slot>>, CacheError> {
        self.slots.lock().map_err(|_| CacheError::LockPoisoned)
    }
}

impl VersionStorer for Cache {
    fn get(&self, key: CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let slots = self.lock_slots()?;
        Ok(slots.get(&key).and_then(|slot| {
            slot.entry
                .as_ref()
                .map(|(version, fetched_at)| CacheEntry {
                    version: version.clone(),
                    fetched_at: *fetched_at,
                    refreshing: slot.refreshing,
                })
        }))
    }

    fn put(&self, key: CacheKey, version: String) -> Result<(), CacheError> {
        debug!("Caching version {} for {}", version, key);
        let mut slots = self.lock_slots()?;
        let slot = slots.entry(key).or_default();
        slot.entry = Some((version, Utc::now()));
        slot.refreshing = false;
        Ok(())
    }

    fn try_start_refresh(&self, key: CacheKey) -> Result<bool, CacheError> {
        let mut slots = self.lock_slots()?;
        let slot = slots.entry(key).or_default();
        if slot.refreshing {
            return Ok(false);
        }
        slot.refreshing = true;
        Ok(true)
    }

    fn finish_refresh(&self, key: CacheKey) -> Result<(), CacheError> {
        let mut slots = self.lock_slots()?;
        let Some(slot) = slots.get_mut(&key) else {
            return Ok(());
        };
        slot.refreshing = false;
        // A claim taken on a never-fetched key leaves no entry behind
        if slot.entry.is_none() {
            slots.remove(&key);
        }
        Ok(())
    }

    fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }
}
