//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TRADEPOST_DATABASE_URL` - `SQLite` connection string
//!   (default: `sqlite://tradepost.db`)
//! - `TRADEPOST_HOST` - Bind address (default: 127.0.0.1)
//! - `TRADEPOST_PORT` - Listen port (default: 3000)

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://tradepost.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `TRADEPOST_HOST` is not a valid IP address.
    #[error("TRADEPOST_HOST is not a valid IP address: {0}")]
    InvalidHost(String),

    /// `TRADEPOST_PORT` is not a valid port number.
    #[error("TRADEPOST_PORT is not a valid port number: {0}")]
    InvalidPort(String),

    /// `TRADEPOST_DATABASE_URL` is set but empty.
    #[error("TRADEPOST_DATABASE_URL must not be empty")]
    EmptyDatabaseUrl,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `SQLite` connection string.
    pub database_url: String,
    /// Bind address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("TRADEPOST_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        if database_url.is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }

        let host_str = std::env::var("TRADEPOST_HOST").unwrap_or_else(|_| DEFAULT_HOST.into());
        let host: IpAddr = host_str
            .parse()
            .map_err(|_| ConfigError::InvalidHost(host_str))?;

        let port = match std::env::var("TRADEPOST_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            database_url,
            host,
            port,
        })
    }

    /// The socket address to bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
