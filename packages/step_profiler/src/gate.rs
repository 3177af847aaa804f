//! Sampling gates that decide which units get profiled.

use std::sync::Arc;

use rand::{Rng, rng};

use crate::{Error, Result};

type Predicate = dyn Fn() -> bool + Send + Sync;

/// Decides, on every [`Profiler::begin()`][1], whether the new unit is profiled.
///
/// When the gate says no, `begin()` hands out an inactive [`Unit`][2] and the
/// operation costs nothing further.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// use step_profiler::{Gate, Profiler};
///
/// let profiler = Profiler::new();
///
/// // Profile every 100th request.
/// let counter = AtomicU64::new(0);
/// profiler.set_gate(Gate::from_fn(move || {
///     counter.fetch_add(1, Ordering::Relaxed) % 100 == 0
/// }));
///
/// let first = profiler.begin("HandleRequest");
/// let second = profiler.begin("HandleRequest");
///
/// assert!(first.is_active());
/// assert!(!second.is_active());
/// ```
///
/// [1]: crate::Profiler::begin
/// [2]: crate::Unit
#[derive(Clone, derive_more::Debug)]
pub struct Gate {
    #[debug(ignore)]
    predicate: Option<Arc<Predicate>>,
}

impl Gate {
    /// A gate that lets every unit through.
    #[must_use]
    pub fn always() -> Self {
        Self { predicate: None }
    }

    /// A gate backed by an arbitrary predicate, evaluated once per `begin()`.
    #[must_use]
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }

    /// A gate that lets through a random `ratio` of units (e.g. `0.01` for 1%).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSampleRatio`] if `ratio` is NaN or outside `0.0..=1.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_profiler::Gate;
    ///
    /// assert!(Gate::sampled(0.01).is_ok());
    /// assert!(Gate::sampled(2.0).is_err());
    /// ```
    pub fn sampled(ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(Error::InvalidSampleRatio { ratio });
        }

        Ok(Self::from_fn(move || rng().random_bool(ratio)))
    }

    /// Evaluates the gate.
    #[must_use]
    pub fn allows(&self) -> bool {
        self.predicate.as_ref().is_none_or(|predicate| predicate())
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::always()
    }
}
