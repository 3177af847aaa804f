use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::CompletedUnit;

/// Ordered collection of ended units, waiting for the next report.
///
/// Grows without bound until drained. Every access goes through one lock, so units ended
/// concurrently from many threads are all kept. A poisoned lock is recovered rather than
/// propagated: a panic elsewhere must not make profiling panic too.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    units: Mutex<Vec<CompletedUnit>>,
}

impl Registry {
    pub(crate) fn record(&self, unit: CompletedUnit) {
        self.units().push(unit);
    }

    /// Takes every unit recorded so far, leaving the registry empty.
    pub(crate) fn drain(&self) -> Vec<CompletedUnit> {
        let units = mem::take(&mut *self.units());

        tracing::debug!(units = units.len(), "drained profiler registry");

        units
    }

    /// Discards every unit recorded so far.
    pub(crate) fn reset(&self) {
        let discarded = mem::take(&mut *self.units());

        tracing::debug!(units = discarded.len(), "reset profiler registry");
    }

    pub(crate) fn len(&self) -> usize {
        self.units().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.units().is_empty()
    }

    fn units(&self) -> MutexGuard<'_, Vec<CompletedUnit>> {
        self.units.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
