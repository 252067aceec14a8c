//! Configuration module for health_probe.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use health_probe::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! println!("Liveness path: {}", config.health.paths.liveness);
//! ```

mod error;
mod health;
mod logging;
mod parse;
mod server;

pub use error::ConfigError;
pub use health::{HealthConfig, LIVENESS_PATTERN_ENV, READINESS_PATTERN_ENV};
pub use logging::{LogFormat, LoggingConfig};
pub use server::{ServerConfig, DEFAULT_LISTEN_ADDR};

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Probe endpoint configuration.
    pub health: HealthConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            health: HealthConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  Liveness path: {}", self.health.paths.liveness);
        info!("  Readiness path: {}", self.health.paths.readiness);

        if !self.health.metadata.is_empty() {
            let keys: Vec<&str> = self.health.metadata.keys().map(String::as_str).collect();
            info!("  Metadata keys: {}", keys.join(", "));
        }

        match self.health.check_timeout {
            Some(timeout) => info!("  Check timeout: {:?}", timeout),
            None => info!("  Check timeout: disabled"),
        }

        for (name, addr) in &self.health.tcp_checks {
            info!("  TCP check: {} -> {}", name, addr);
        }

        if self.logging.format == LogFormat::Json {
            info!("  Log format: json");
        }
    }
}
