use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use server_version_api::config::{ServiceConfig, log_path};
use server_version_api::logging;
use server_version_api::server::run_server;
use server_version_api::version::fetcher::Fetcher;
use server_version_api::version::fetchers::DownloadPageFetcher;
use server_version_api::version::types::{CacheKey, Channel, Platform};

#[derive(Parser)]
#[command(name = "server-version-api")]
#[command(version, about = "Cached lookup service for the latest dedicated server builds")]
struct Cli {
    /// JSON config file; missing fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to a file instead of stderr (defaults to the data directory)
    #[arg(long, global = true, num_args = 0..=1, value_name = "PATH")]
    log_file: Option<Option<PathBuf>>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Cache TTL in milliseconds
        #[arg(long)]
        ttl_ms: Option<i64>,
    },
    /// Fetch the latest version once, bypassing the cache
    Fetch {
        #[arg(value_parser = parse_platform)]
        platform: Platform,

        #[arg(long)]
        preview: bool,
    },
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse()
        .map_err(|()| format!("unknown platform {s:?} (expected win or linux)"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_file = cli.log_file.clone().map(|path| path.unwrap_or_else(log_path));
    let _guard = logging::init(cli.json_logs, log_file.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        None => runtime.block_on(serve(config)),
        Some(Command::Serve { bind, ttl_ms }) => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(ttl_ms) = ttl_ms {
                config.cache.ttl = ttl_ms;
            }
            runtime.block_on(serve(config))
        }
        Some(Command::Fetch { platform, preview }) => runtime.block_on(async {
            let fetcher = DownloadPageFetcher::from_config(&config.fetcher)?;
            let key = CacheKey::new(platform, Channel::from_preview(preview));
            let version = fetcher.fetch_latest(key).await?;
            println!("{version}");
            Ok::<(), anyhow::Error>(())
        }),
    }
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    info!(
        "Starting {} {} (ttl {} ms)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.cache.ttl
    );
    let fetcher: Arc<dyn Fetcher> = Arc::new(DownloadPageFetcher::from_config(&config.fetcher)?);
    run_server(config, fetcher).await
}
