//! Version cache layer for server build lookups
//!
//! This module answers "what is the latest server version for this
//! platform/channel?" from an in-memory cache that is refreshed in the
//! background, so callers never wait on the slow external source unless
//! nothing is cached yet.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Service   │────▶│    Cache    │◀────│   Refresh   │
//! │  (lookup)   │     │  (storage)  │     │(single-flt) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │   Warm-up   │────────────────────────▶│   Fetcher   │
//! │  (startup)  │                         │(download pg)│
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: In-memory entries with per-key refresh claims
//! - [`refresh`]: Stale/absent detection and background refresh
//! - [`service`]: The public lookup and status operations
//! - [`warmup`]: Parallel startup population of every key
//! - [`fetcher`]: Fetcher trait for the external source
//! - [`fetchers`]: Concrete fetcher implementations
//! - [`error`]: Error types for cache, fetch and lookup operations
//! - [`types`]: Platform, channel and cache key types

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod fetchers;
pub mod refresh;
pub mod service;
pub mod types;
pub mod warmup;
