//! Fetcher test utilities

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};

use server_version_api::version::error::FetchError;
use server_version_api::version::fetcher::Fetcher;
use server_version_api::version::types::CacheKey;

/// Fetcher that replays scripted results in order and counts calls
///
/// When gated, each call waits for a permit from [`ScriptedFetcher::release`]
/// before returning, so tests can observe a refresh while it is in flight.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicUsize,
    gate: Option<Semaphore>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn then_ok(self, version: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(version.to_string()));
        self
    }

    pub fn then_err(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Let `n` gated calls complete
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch_latest(&self, _key: CacheKey) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(version)) => Ok(version),
            Some(Err(message)) => Err(FetchError::LinkNotFound(message)),
            None => Err(FetchError::LinkNotFound("script exhausted".to_string())),
        }
    }
}

/// Poll `condition` until it holds, failing the test after two seconds
pub async fn wait_until(condition: impl Fn() -> bool) {
    timeout(Duration::from_secs(2), async {
        while !condition() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met within timeout");
}
