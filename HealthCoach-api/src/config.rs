//! Server configuration read from the environment

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use health_coach_domain::auth::{SecurityError, TokenConfig};
use health_coach_domain::relay::DEFAULT_CHANNEL_CAPACITY;

/// Default listening port
pub const DEFAULT_PORT: u16 = 5000;

/// Default directory for the SQLite file
pub const DEFAULT_DATA_DIR: &str = "data";

/// File name of the SQLite database inside the data directory
pub const DATABASE_FILE_NAME: &str = "health_coach.db";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Token configuration error: {0}")]
    Token(#[from] SecurityError),
}

/// Settings needed to start the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Directory holding the SQLite file
    pub data_dir: PathBuf,
    /// Explicit SQLite path, overrides `data_dir`
    pub sqlite_path: Option<PathBuf>,
    /// Buffer size of the heart rate broadcast channel
    pub relay_capacity: usize,
    /// Deployment environment name reported by the health check
    pub environment: String,
    /// Token signing settings
    pub token: TokenConfig,
}

impl ServerConfig {
    /// Load the configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_value("PORT", env::var("PORT").ok(), DEFAULT_PORT)?;
        let relay_capacity = parse_value(
            "RELAY_CHANNEL_CAPACITY",
            env::var("RELAY_CHANNEL_CAPACITY").ok(),
            DEFAULT_CHANNEL_CAPACITY,
        )?;
        if relay_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RELAY_CHANNEL_CAPACITY".to_string(),
                value: "0".to_string(),
            });
        }

        let config = Self {
            port,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            sqlite_path: env::var("DB_SQLITE_PATH").ok().map(PathBuf::from),
            relay_capacity,
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            token: TokenConfig::from_env()?,
        };

        info!(
            "Server configuration: port={}, relay_capacity={}, environment={}",
            config.port, config.relay_capacity, config.environment
        );

        Ok(config)
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DATABASE_FILE_NAME))
    }
}

/// Parse an optional raw value, falling back to `default` when absent
fn parse_value<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("/var/lib/health-coach"),
            sqlite_path: None,
            relay_capacity: DEFAULT_CHANNEL_CAPACITY,
            environment: "test".to_string(),
            token: TokenConfig::new("config-test-secret"),
        }
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("PORT", None, 5000u16).unwrap(), 5000);
        assert_eq!(parse_value("PORT", Some(" 8080 ".to_string()), 5000u16).unwrap(), 8080);

        let err = parse_value("PORT", Some("eighty".to_string()), 5000u16).unwrap_err();
        assert_eq!(err.to_string(), "PORT has an invalid value: eighty");
    }

    #[test]
    fn test_database_path() {
        let mut config = config();
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/health-coach/health_coach.db"));

        config.sqlite_path = Some(PathBuf::from("/tmp/other.db"));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/other.db"));
    }
}
