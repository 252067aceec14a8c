//! Probe endpoint configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use super::parse::{env_duration, env_or, env_pairs};
use super::ConfigError;
use crate::health::{ProbePaths, DEFAULT_LIVENESS_PATH, DEFAULT_READINESS_PATH};

/// Environment variable selecting the liveness path.
pub const LIVENESS_PATTERN_ENV: &str = "HEALTH_LIVENESS_PATTERN";
/// Environment variable selecting the readiness path.
pub const READINESS_PATTERN_ENV: &str = "HEALTH_READYNESS_PATTERN";

/// Health endpoint configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct HealthConfig {
    /// Liveness and readiness paths (default: /live, /ready).
    pub paths: ProbePaths,
    /// Static metadata echoed in `?full=1` responses.
    pub metadata: BTreeMap<String, String>,
    /// Timeout applied to the built-in checks (None = no timeout).
    pub check_timeout: Option<Duration>,
    /// Readiness TCP dial checks as (name, host:port).
    pub tcp_checks: Vec<(String, String)>,
}

impl HealthConfig {
    /// Load configuration from environment variables.
    ///
    /// Each path falls back to its default on its own.
    pub fn from_env() -> Result<Self, ConfigError> {
        let paths = ProbePaths {
            liveness: env_or(LIVENESS_PATTERN_ENV, DEFAULT_LIVENESS_PATH),
            readiness: env_or(READINESS_PATTERN_ENV, DEFAULT_READINESS_PATH),
        };
        validate_path(LIVENESS_PATTERN_ENV, &paths.liveness)?;
        validate_path(READINESS_PATTERN_ENV, &paths.readiness)?;
        if paths.liveness == paths.readiness {
            return Err(ConfigError::Invalid {
                key: READINESS_PATTERN_ENV.into(),
                message: format!("same path as liveness ({})", paths.liveness),
            });
        }

        Ok(Self {
            paths,
            metadata: env_pairs("HEALTH_METADATA")?.into_iter().collect(),
            check_timeout: env_duration("HEALTH_CHECK_TIMEOUT", "off")?,
            tcp_checks: env_pairs("HEALTH_TCP_CHECKS")?,
        })
    }
}

fn validate_path(key: &str, path: &str) -> Result<(), ConfigError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key: key.into(),
            message: format!("path must start with '/', got '{}'", path),
        })
    }
}
