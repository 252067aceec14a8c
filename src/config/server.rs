//! Server configuration.

use std::net::SocketAddr;

use super::parse::env_parse;
use super::ConfigError;

/// Default probe server address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9090";

/// Server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:9090).
    pub listen_addr: SocketAddr,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default: SocketAddr = DEFAULT_LISTEN_ADDR.parse().map_err(|e| ConfigError::Parse {
            key: "LISTEN_ADDR".into(),
            value: DEFAULT_LISTEN_ADDR.into(),
            error: format!("{}", e),
        })?;

        Ok(Self {
            listen_addr: env_parse("LISTEN_ADDR", default)?,
        })
    }
}
