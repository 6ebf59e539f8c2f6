// Configuration for the Arena table service

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variables prefixed with this override file values,
/// e.g. `ARENA__DATABASE__URL`.
pub const ENV_PREFIX: &str = "ARENA";

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub bind_port: u16,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            bind_port: 8080,
            enable_cors: true,
        }
    }
}

/// Database connection and pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    /// Schema the introspector treats as the owner of user tables.
    pub schema: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub idle_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
    /// How long `close` waits for checked-out connections.
    pub close_grace_secs: u64,
    /// SQL script run once at startup (schema and seed rows).
    pub init_script: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://arena.db".to_string(),
            schema: "main".to_string(),
            min_connections: 1,
            max_connections: 3,
            idle_timeout_secs: 60,
            acquire_timeout_secs: 30,
            close_grace_secs: 10,
            init_script: None,
        }
    }
}

impl DatabaseConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn close_grace(&self) -> Duration {
        Duration::from_secs(self.close_grace_secs)
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl ArenaConfig {
    /// Defaults, then the optional TOML file, then `ARENA__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder().add_source(defaults_source()?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: ArenaConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Configuration(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse a TOML document layered over the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let loaded: ArenaConfig = config::Config::builder()
            .add_source(defaults_source()?)
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Configuration(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        let db = &self.database;
        if db.max_connections == 0 {
            return Err(Error::Configuration(
                "database.max_connections must be > 0".to_string(),
            ));
        }
        if db.min_connections > db.max_connections {
            return Err(Error::Configuration(
                "database.min_connections cannot be greater than database.max_connections".to_string(),
            ));
        }
        if db.url.trim().is_empty() {
            return Err(Error::Configuration("database.url cannot be empty".to_string()));
        }
        if db.schema.trim().is_empty() {
            return Err(Error::Configuration("database.schema cannot be empty".to_string()));
        }
        if self.server.bind_port == 0 {
            return Err(Error::Configuration("server.bind_port cannot be 0".to_string()));
        }
        Ok(())
    }
}

fn defaults_source() -> Result<config::Config> {
    config::Config::try_from(&ArenaConfig::default())
        .map_err(|e| Error::Configuration(e.to_string()))
}
