//! health_probe - Liveness and readiness probes for Kubernetes-style orchestrators.
//!
//! Services register named checks in two independent sets, liveness and
//! readiness. Each probe request runs the relevant checks on demand and
//! answers 200 when all of them pass, 503 otherwise.
//!
//! # Features
//!
//! - **Check Registry**: Named checks behind a single read/write lock, safe to
//!   extend while probes are being served
//! - **Readiness implies liveness**: The readiness probe also runs every
//!   liveness check
//! - **Verbose mode**: `?full=1` returns per-check results and static metadata
//! - **Fault containment**: A panicking check is reported as a failure
//! - **Ready-made checks**: Timeout wrapper, TCP dial, DNS resolution
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use health_probe::health::{CheckError, HealthHandler};
//!
//! let handler = Arc::new(HealthHandler::default());
//! handler.add_liveness_check("db", || -> Result<(), CheckError> { Ok(()) });
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:9090").await?;
//! health_probe::server::serve(listener, handler).await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod health;
pub mod logging;
pub mod server;

// Re-exports for convenience
pub use config::Config;
pub use health::{Check, CheckError, HandlerOptions, HealthHandler};
