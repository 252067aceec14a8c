//! Check failure type.

use std::fmt;

/// Reason a health check reported itself unhealthy.
///
/// `Display` renders the bare reason; that string is what appears next to
/// the check name in a `?full=1` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckError {
    reason: String,
}

impl CheckError {
    /// Create a failure with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The failure reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for CheckError {}

impl From<std::io::Error> for CheckError {
    fn from(e: std::io::Error) -> Self {
        CheckError::new(e.to_string())
    }
}

impl From<String> for CheckError {
    fn from(reason: String) -> Self {
        CheckError::new(reason)
    }
}

impl From<&str> for CheckError {
    fn from(reason: &str) -> Self {
        CheckError::new(reason)
    }
}
