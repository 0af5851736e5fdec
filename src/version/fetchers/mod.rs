//! Fetcher implementations for resolving server versions

pub mod download_page;

pub use download_page::DownloadPageFetcher;
