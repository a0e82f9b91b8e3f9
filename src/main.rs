use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use record_collection_server::config::{AppConfig, CliConfig, FileConfig};
use record_collection_server::server::state::{GuardedCollectionStore, GuardedEnrichmentGateway};
use record_collection_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use record_collection_server::{NoOpGateway, ProviderGateway, SqliteCollectionStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the collection database (collection.db).
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Optional TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Timeout in seconds for each enrichment provider call.
    #[clap(long, default_value_t = 10)]
    pub enrichment_timeout_sec: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir.clone(),
        port: cli_args.port,
        logging_level: cli_args.logging_level.clone(),
        frontend_dir_path: cli_args.frontend_dir_path.clone(),
        enrichment_timeout_sec: cli_args.enrichment_timeout_sec,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let db_path = config.collection_db_path();
    info!("Opening collection database at {:?}...", db_path);
    let collection_store: GuardedCollectionStore = Arc::new(
        SqliteCollectionStore::with_read_pool(&db_path, config.read_pool_size)
            .with_context(|| format!("Failed to open collection store at {:?}", db_path))?,
    );

    let provider_gateway = ProviderGateway::from_settings(&config.enrichment)?;
    let enrichment: GuardedEnrichmentGateway = if provider_gateway.has_providers() {
        Arc::new(provider_gateway)
    } else {
        Arc::new(NoOpGateway)
    };

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        frontend_dir_path: config.frontend_dir_path.clone(),
    };
    run_server(server_config, collection_store, enrichment).await
}
