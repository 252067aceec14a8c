//! Ready-made checks.
//!
//! Each helper returns a value implementing [`Check`] that can be registered
//! directly or wrapped in [`timeout`].

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use super::{Check, CheckError};

/// Wraps a check so that it fails if it does not return within `limit`.
///
/// The wrapped check runs on its own thread. At most one run is in flight
/// per wrapper: while an overrunning run has not returned, later calls wait
/// on it instead of starting another thread, and fail with
/// `previous run still in progress` if it is still busy after `limit`.
pub fn timeout<C>(check: C, limit: Duration) -> Timeout<C>
where
    C: Check + 'static,
{
    Timeout {
        inner: Arc::new(check),
        limit,
        pending: Mutex::new(None),
    }
}

type Outcome = Result<(), CheckError>;

/// Check returned by [`timeout`].
pub struct Timeout<C> {
    inner: Arc<C>,
    limit: Duration,
    // Receiver of a run that overran its limit and has not reported yet
    pending: Mutex<Option<Receiver<Outcome>>>,
}

impl<C> Timeout<C>
where
    C: Check + 'static,
{
    fn spawn(&self) -> Result<Receiver<Outcome>, CheckError> {
        let (tx, rx) = mpsc::sync_channel(1);
        let inner = Arc::clone(&self.inner);

        thread::Builder::new()
            .name("health-check".into())
            .spawn(move || {
                let _ = tx.send(inner.check());
            })?;

        Ok(rx)
    }
}

impl<C> Check for Timeout<C>
where
    C: Check + 'static,
{
    fn check(&self) -> Result<(), CheckError> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        // A stale result from an earlier overrun is dropped; only a run that
        // is still going is reused.
        let (rx, reused) = match pending.take() {
            Some(rx) => match rx.try_recv() {
                Err(TryRecvError::Empty) => (rx, true),
                _ => (self.spawn()?, false),
            },
            None => (self.spawn()?, false),
        };

        match rx.recv_timeout(self.limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                *pending = Some(rx);
                if reused {
                    Err(CheckError::new("previous run still in progress"))
                } else {
                    Err(CheckError::new(format!("timed out after {:?}", self.limit)))
                }
            }
            // Sender dropped without sending: the check panicked
            Err(RecvTimeoutError::Disconnected) => {
                Err(CheckError::new("check terminated without a result"))
            }
        }
    }
}

/// Succeeds if a TCP connection to `addr` can be opened within `limit`.
pub fn tcp_dial(addr: impl Into<String>, limit: Duration) -> impl Check {
    let addr = addr.into();
    move || -> Result<(), CheckError> {
        let targets = resolve(&addr)?;
        let mut last_err = None;
        for target in targets {
            match TcpStream::connect_timeout(&target, limit) {
                Ok(_) => return Ok(()),
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => CheckError::new(format!("dial {}: {}", addr, e)),
            None => CheckError::new(format!("dial {}: no addresses", addr)),
        })
    }
}

/// Succeeds if `host` resolves to at least one address.
///
/// `host` may carry a port (`db.internal:5432`); a bare host name is
/// resolved with port 0.
pub fn dns_resolve(host: impl Into<String>) -> impl Check {
    let host = host.into();
    move || -> Result<(), CheckError> {
        if resolve(&host)?.is_empty() {
            Err(CheckError::new(format!("lookup {}: no addresses", host)))
        } else {
            Ok(())
        }
    }
}

fn resolve(target: &str) -> Result<Vec<SocketAddr>, CheckError> {
    let lookup = if target.parse::<SocketAddr>().is_ok() || has_port(target) {
        target.to_socket_addrs()
    } else {
        (target, 0).to_socket_addrs()
    };
    lookup
        .map(|addrs| addrs.collect())
        .map_err(|e| CheckError::new(format!("lookup {}: {}", target, e)))
}

fn has_port(target: &str) -> bool {
    match target.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty() && !host.ends_with(':') && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}
