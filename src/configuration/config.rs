use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Command line of the `camara` binary.
///
/// Every flag overrides the matching value of the configuration file and can
/// also be given through a `CAMARA_*` environment variable.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "camara")]
#[command(version)]
#[command(about = "Legislative session, attendance and voting service for municipal councils")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    pub config_file: Option<PathBuf>,

    /// IP address the HTTP server listens on
    #[arg(long, env = "CAMARA_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// TCP port the HTTP server listens on
    #[arg(long, env = "CAMARA_PORT")]
    pub port: Option<u16>,

    /// SQLite connection string (e.g. `sqlite://camara.sqlite3?mode=rwc`)
    #[arg(long, env = "CAMARA_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep everything in memory instead of opening the database
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub memory: bool,

    /// Default log level when `RUST_LOG` is not set
    #[arg(long, env = "CAMARA_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Application configuration.
///
/// # Fields Overview
///
/// - `server`: where the HTTP server listens
/// - `storage`: which backend to use and how to reach the database
/// - `logging`: default log level
///
/// Every section and field is optional in the file; missing values take the
/// defaults of their section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Builds the effective configuration: file (or defaults), then CLI overrides.
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match args.config_file {
            Some(ref path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(ref bind_address) = args.bind_address {
            config.server.bind_address = bind_address.clone();
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if let Some(ref url) = args.database_url {
            config.storage.database_url = url.clone();
        }
        if args.memory {
            config.storage.backend = StorageBackend::Memory;
        }
        if let Some(ref level) = args.log_level {
            config.logging.level = level.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        self.log_level()?;
        if self.storage.backend == StorageBackend::Database {
            if self.storage.database_url.trim().is_empty() {
                return Err(ConfigError::BadStorage("database_url must not be empty".into()));
            }
            if self.storage.max_connections == 0 {
                return Err(ConfigError::NotInRange("max_connections must be at least 1".into()));
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.bind_address, self.server.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                ConfigError::BadBindAddress(format!("{}: {}", self.server.bind_address, e))
            })
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        self.logging
            .level
            .parse::<LevelFilter>()
            .map_err(|_| {
                ConfigError::NotInRange(format!("unknown log level '{}'", self.logging.level))
            })
    }
}
