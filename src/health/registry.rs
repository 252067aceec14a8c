//! Thread-safe storage and execution of named checks.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use super::{AggregateStatus, Check, CheckError, CheckResults, CheckSet};

type CheckMap = HashMap<String, Arc<dyn Check>>;

#[derive(Default)]
struct CheckSets {
    liveness: CheckMap,
    readiness: CheckMap,
}

impl CheckSets {
    fn get(&self, set: CheckSet) -> &CheckMap {
        match set {
            CheckSet::Liveness => &self.liveness,
            CheckSet::Readiness => &self.readiness,
        }
    }

    fn get_mut(&mut self, set: CheckSet) -> &mut CheckMap {
        match set {
            CheckSet::Liveness => &mut self.liveness,
            CheckSet::Readiness => &mut self.readiness,
        }
    }
}

/// Liveness and readiness checks plus the static metadata echoed in
/// verbose responses.
///
/// Both check maps sit behind a single read/write lock: probes take the read
/// side and may run concurrently with each other, registration takes the
/// write side. Metadata is fixed at construction and read without locking.
pub struct CheckRegistry {
    checks: RwLock<CheckSets>,
    metadata: BTreeMap<String, String>,
}

impl CheckRegistry {
    /// Create an empty registry with the given metadata.
    pub fn new(metadata: BTreeMap<String, String>) -> Self {
        Self {
            checks: RwLock::new(CheckSets::default()),
            metadata,
        }
    }

    /// Insert or replace a named liveness check.
    pub fn add_liveness_check(&self, name: impl Into<String>, check: impl Check + 'static) {
        self.add(CheckSet::Liveness, name.into(), Arc::new(check));
    }

    /// Insert or replace a named readiness check.
    pub fn add_readiness_check(&self, name: impl Into<String>, check: impl Check + 'static) {
        self.add(CheckSet::Readiness, name.into(), Arc::new(check));
    }

    /// Insert or replace a named check in the given set.
    ///
    /// No validation is done: empty names are accepted.
    pub fn add(&self, set: CheckSet, name: String, check: Arc<dyn Check>) {
        self.write().get_mut(set).insert(name, check);
    }

    /// Static metadata attached to every verbose response.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Number of checks registered in a set.
    pub fn len(&self, set: CheckSet) -> usize {
        self.read().get(set).len()
    }

    /// Whether a set has no checks registered.
    pub fn is_empty(&self, set: CheckSet) -> bool {
        self.len(set) == 0
    }

    /// Sorted names of the checks registered in a set.
    pub fn names(&self, set: CheckSet) -> Vec<String> {
        let mut names: Vec<String> = self.read().get(set).keys().cloned().collect();
        names.sort();
        names
    }

    /// Run every check in `set` and merge the outcomes into `results`.
    ///
    /// Checks run one after another while the read lock is held. A passing
    /// check records "OK", a failing one records its reason and marks
    /// `status` unavailable. A panicking check counts as a failure.
    pub fn collect_checks(
        &self,
        set: CheckSet,
        results: &mut CheckResults<'_>,
        status: &mut AggregateStatus,
    ) {
        let checks = self.read();
        for (name, check) in checks.get(set) {
            match run_contained(check.as_ref()) {
                Ok(()) => results.pass(name),
                Err(e) => {
                    warn!(check = %name, set = %set, reason = %e, "Health check failed");
                    status.mark_unavailable();
                    results.fail(name, e.to_string());
                }
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CheckSets> {
        self.checks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CheckSets> {
        self.checks.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

/// Execute a check, turning a panic into a failure.
fn run_contained(check: &dyn Check) -> Result<(), CheckError> {
    match panic::catch_unwind(AssertUnwindSafe(|| check.check())) {
        Ok(result) => result,
        Err(payload) => Err(CheckError::new(format!(
            "check panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
