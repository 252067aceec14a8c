//! Probe and result types.

use std::collections::BTreeMap;

use http::StatusCode;
use serde::Serialize;

/// Result string recorded for a passing check.
pub const CHECK_OK: &str = "OK";

/// One of the two independently addressable check collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckSet {
    /// Is the process functioning? (restart container if failed)
    Liveness,
    /// Should the process receive traffic? (remove from LB if failed)
    Readiness,
}

impl std::fmt::Display for CheckSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Liveness => write!(f, "liveness"),
            Self::Readiness => write!(f, "readiness"),
        }
    }
}

/// Probe endpoint types (Kubernetes-compatible).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeType {
    /// Liveness probe: runs the liveness set only.
    Liveness,
    /// Readiness probe: runs the readiness set, then the liveness set.
    Readiness,
}

impl ProbeType {
    /// Check sets aggregated by this probe, in execution order.
    ///
    /// Later sets overwrite earlier ones on a name collision, so a liveness
    /// result wins over a readiness result of the same name.
    pub fn check_sets(self) -> &'static [CheckSet] {
        match self {
            Self::Liveness => &[CheckSet::Liveness],
            Self::Readiness => &[CheckSet::Readiness, CheckSet::Liveness],
        }
    }
}

impl std::fmt::Display for ProbeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Liveness => write!(f, "liveness"),
            Self::Readiness => write!(f, "readiness"),
        }
    }
}

/// Worst outcome seen across all checks of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregateStatus {
    #[default]
    Ok,
    Unavailable,
}

impl AggregateStatus {
    /// Record a failure. Never reverts to `Ok`.
    #[inline]
    pub fn mark_unavailable(&mut self) {
        *self = AggregateStatus::Unavailable;
    }

    #[inline]
    pub fn is_ok(self) -> bool {
        self == AggregateStatus::Ok
    }

    /// HTTP status code for this outcome (200 or 503).
    pub fn status_code(self) -> StatusCode {
        match self {
            AggregateStatus::Ok => StatusCode::OK,
            AggregateStatus::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Per-request result set rendered by `?full=1`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResults<'a> {
    /// Check name to "OK" or failure reason
    pub checks: BTreeMap<String, String>,
    /// Static metadata shared by every response
    pub metadata: &'a BTreeMap<String, String>,
    #[serde(skip)]
    failed: usize,
}

impl<'a> CheckResults<'a> {
    /// Create an empty result set carrying the given metadata.
    pub fn new(metadata: &'a BTreeMap<String, String>) -> Self {
        Self {
            checks: BTreeMap::new(),
            metadata,
            failed: 0,
        }
    }

    /// Record a passing check.
    pub fn pass(&mut self, name: &str) {
        self.checks.insert(name.to_string(), CHECK_OK.to_string());
    }

    /// Record a failing check with its reason.
    pub fn fail(&mut self, name: &str, reason: impl Into<String>) {
        self.failed += 1;
        self.checks.insert(name.to_string(), reason.into());
    }

    /// Number of failing check runs recorded, whatever their reasons read.
    pub fn failed(&self) -> usize {
        self.failed
    }
}
