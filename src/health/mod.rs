//! Health check module for Kubernetes probes.
//!
//! Keeps two independent sets of named checks:
//! - **Liveness**: Is the process alive? (restart container if failed)
//! - **Readiness**: Can the service handle traffic? (remove from LB if failed)
//!
//! Checks run on demand, once per probe request. The readiness probe runs
//! the liveness checks too, so a service that is not alive is never ready.
//! Responses answer 200 when every check passes and 503 otherwise; append
//! `?full=1` to get per-check results and static metadata as JSON.
//!
//! # Kubernetes Integration
//!
//! ```yaml
//! livenessProbe:
//!   httpGet:
//!     path: /live
//!     port: 9090
//!   initialDelaySeconds: 5
//!   periodSeconds: 10
//!
//! readinessProbe:
//!   httpGet:
//!     path: /ready
//!     port: 9090
//!   initialDelaySeconds: 5
//!   periodSeconds: 5
//! ```
//!
//! # Example
//!
//! ```rust
//! use health_probe::health::{checks, CheckError, HealthHandler};
//! use std::time::Duration;
//!
//! let handler = HealthHandler::default();
//! handler.add_liveness_check("always", || -> Result<(), CheckError> { Ok(()) });
//! handler.add_readiness_check(
//!     "upstream",
//!     checks::timeout(checks::dns_resolve("localhost"), Duration::from_secs(1)),
//! );
//! ```

mod check;
pub mod checks;
mod error;
mod handler;
mod registry;
mod status;

pub use check::Check;
pub use error::CheckError;
pub use handler::{
    HandlerOptions, HealthHandler, ProbePaths, DEFAULT_LIVENESS_PATH, DEFAULT_READINESS_PATH,
};
pub use registry::CheckRegistry;
pub use status::{AggregateStatus, CheckResults, CheckSet, ProbeType, CHECK_OK};
