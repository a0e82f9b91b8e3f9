mod file_config;

pub use file_config::{EnrichmentConfig, FileConfig};

use crate::collection_store::DEFAULT_READ_POOL_SIZE;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DISCOGS_KEY_ENV: &str = "DISCOGS_API_KEY";
pub const DISCOGS_SECRET_ENV: &str = "DISCOGS_API_SECRET";
pub const LASTFM_KEY_ENV: &str = "LASTFM_API_KEY";

const DEFAULT_USER_AGENT: &str = concat!("RecordCollection/", env!("CARGO_PKG_VERSION"));

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub enrichment_timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub read_pool_size: usize,
    pub enrichment: EnrichmentSettings,
}

/// Effective provider settings. A provider without credentials is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentSettings {
    pub discogs_key: Option<String>,
    pub discogs_secret: Option<String>,
    pub lastfm_api_key: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl EnrichmentSettings {
    pub fn discogs_credentials(&self) -> Option<(&str, &str)> {
        match (&self.discogs_key, &self.discogs_secret) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present; provider credentials
    /// missing from the file are read from the environment.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        Self::resolve_with_env(cli, file_config, |name| std::env::var(name).ok())
    }

    fn resolve_with_env<E>(cli: &CliConfig, file_config: Option<FileConfig>, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        let read_pool_size = file.read_pool_size.unwrap_or(DEFAULT_READ_POOL_SIZE);

        let enrichment_file = file.enrichment.unwrap_or_default();
        let from_file_or_env = |value: Option<String>, var: &str| {
            value
                .or_else(|| env(var))
                .filter(|v| !v.trim().is_empty())
        };
        let enrichment = EnrichmentSettings {
            discogs_key: from_file_or_env(enrichment_file.discogs_key, DISCOGS_KEY_ENV),
            discogs_secret: from_file_or_env(enrichment_file.discogs_secret, DISCOGS_SECRET_ENV),
            lastfm_api_key: from_file_or_env(enrichment_file.lastfm_api_key, LASTFM_KEY_ENV),
            timeout: Duration::from_secs(
                enrichment_file
                    .timeout_sec
                    .unwrap_or(cli.enrichment_timeout_sec),
            ),
            user_agent: enrichment_file
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        };

        Ok(Self {
            db_dir,
            port,
            logging_level,
            frontend_dir_path,
            read_pool_size,
            enrichment,
        })
    }

    pub fn collection_db_path(&self) -> PathBuf {
        self.db_dir.join("collection.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
