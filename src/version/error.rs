use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("Download link not found for {0}")]
    LinkNotFound(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid link pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
