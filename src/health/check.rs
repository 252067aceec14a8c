//! The health check capability.

use super::CheckError;

/// A unit of work reporting whether some part of the service is healthy.
///
/// A check carries no name; it is registered under one in a
/// [`CheckRegistry`](super::CheckRegistry). Checks run synchronously on the
/// probing request, so an implementation that blocks delays the response.
///
/// Any `Fn() -> Result<(), CheckError>` closure is a check:
///
/// ```rust
/// use health_probe::health::{Check, CheckError};
///
/// let check = || -> Result<(), CheckError> { Err("timeout".into()) };
/// assert_eq!(check.check().unwrap_err().reason(), "timeout");
/// ```
pub trait Check: Send + Sync {
    /// Execute the check.
    fn check(&self) -> Result<(), CheckError>;
}

impl<F> Check for F
where
    F: Fn() -> Result<(), CheckError> + Send + Sync,
{
    fn check(&self) -> Result<(), CheckError> {
        self()
    }
}
