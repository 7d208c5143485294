//! Server configuration, read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present.
//!
//! # Optional Variables
//!
//! - `DATABASE_URL` - Sea-ORM connection string (default: `sqlite://hotelcrate.db?mode=rwc`)
//! - `HOTELCRATE_HOST` - Bind address (default: 127.0.0.1)
//! - `HOTELCRATE_PORT` - Bind port (default: 3000)
//! - `HOTELCRATE_LOG` - `tracing` filter used when `RUST_LOG` is unset (default: info)

use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://hotelcrate.db?mode=rwc";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3000";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Database connection string
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    /// Log filter directive, e.g. `hotelcrate=debug,sea_orm=info`
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the host or port cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the host or port cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = get_or_default("HOTELCRATE_HOST", DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOTELCRATE_HOST".to_string(), e.to_string()))?;
        let port = get_or_default("HOTELCRATE_PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOTELCRATE_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            database_url: get_or_default("DATABASE_URL", DEFAULT_DATABASE_URL),
            host,
            port,
            log_filter: get_or_default("HOTELCRATE_LOG", DEFAULT_LOG_FILTER),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
