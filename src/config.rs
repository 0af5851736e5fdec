use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::version::types::Platform;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default cache TTL in milliseconds (1 hour)
pub const DEFAULT_TTL_MS: i64 = 60 * 60 * 1000;

/// Timeout for fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: i64 = 30_000;

/// Delay between starting each warm-up fetch to avoid rate limiting (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

// =============================================================================
// Source defaults
// =============================================================================

/// Page listing the current dedicated server downloads
pub const DEFAULT_PAGE_URL: &str = "https://www.minecraft.net/en-us/download/server/bedrock";

/// File name prefix of the server archives linked from the download page
pub const DEFAULT_ARTIFACT_PREFIX: &str = "bedrock-server";

const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Service configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    pub cache: CacheConfig,
    pub fetcher: FetcherConfig,
    pub server: ServerConfig,
    /// Platforms in the key space; each is tracked on every channel
    pub platforms: Vec<Platform>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            fetcher: FetcherConfig::default(),
            server: ServerConfig::default(),
            platforms: Platform::ALL.to_vec(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file; missing fields use defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Time-to-live of cached versions in milliseconds
    pub ttl: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL_MS,
        }
    }
}

/// Download page fetcher configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetcherConfig {
    pub page_url: String,
    pub artifact_prefix: String,
    /// Per-request timeout in milliseconds
    pub timeout: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            artifact_prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
            timeout: FETCH_TIMEOUT_MS as u64,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

/// Returns the path to the data directory for this service.
/// Uses $XDG_DATA_HOME/<name> if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/<name>,
/// or ./<name> if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default path of the log file.
pub fn log_path() -> PathBuf {
    data_dir().join(format!("{APP_NAME}.log"))
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn service_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<ServiceConfig>(json!({
            "cache": {
                "ttl": 1000
            }
        }))
        .unwrap();

        assert_eq!(result.cache.ttl, 1000);
        assert_eq!(result.fetcher, FetcherConfig::default());
        assert_eq!(result.platforms, vec![Platform::Win, Platform::Linux]);
    }

    #[test]
    fn service_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<ServiceConfig>(json!({
            "cache": { "ttl": 5000 },
            "fetcher": {
                "pageUrl": "http://localhost:9000/download",
                "artifactPrefix": "server",
                "timeout": 2000
            },
            "server": { "bind": "0.0.0.0:8080" },
            "platforms": ["linux"]
        }))
        .unwrap();

        assert_eq!(
            result,
            ServiceConfig {
                cache: CacheConfig { ttl: 5000 },
                fetcher: FetcherConfig {
                    page_url: "http://localhost:9000/download".to_string(),
                    artifact_prefix: "server".to_string(),
                    timeout: 2000,
                },
                server: ServerConfig {
                    bind: "0.0.0.0:8080".parse().unwrap(),
                },
                platforms: vec![Platform::Linux],
            }
        );
    }

    #[test]
    fn service_config_rejects_unknown_platform() {
        let result = serde_json::from_value::<ServiceConfig>(json!({
            "platforms": ["macos"]
        }));

        assert!(result.is_err());
    }

    #[test]
    fn load_reads_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"cache": {{"ttl": 42}}}}"#).unwrap();

        let config = ServiceConfig::load(file.path()).unwrap();

        assert_eq!(config.cache.ttl, 42);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = ServiceConfig::load(file.path());

        assert!(matches!(result, Err(ConfigError::Parse { path, .. }) if path == file.path()));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = ServiceConfig::load(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/server-version-api"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(
            path,
            PathBuf::from("/home/user/.local/share/server-version-api")
        );
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./server-version-api"));
    }
}
