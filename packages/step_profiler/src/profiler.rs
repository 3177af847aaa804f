use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;

use crate::pal::PlatformFacade;
use crate::registry::Registry;
use crate::{CompletedUnit, Gate, ProfilerBuilder, Result, Summary, Unit, write_log_lines};

pub(crate) type Sink = Box<dyn Write + Send>;

/// Collects timed units and reports on them.
///
/// A profiler is a cheap handle: clones share the same configuration and the same set of
/// ended units, so a clone can be handed to every task that needs to time its work.
/// Independent profilers can coexist in one process.
///
/// # Examples
///
/// ```
/// use step_profiler::Profiler;
///
/// let profiler = Profiler::new();
///
/// for request in 0..10 {
///     let mut unit = profiler.begin("HandleRequest");
///     // parse the request
///     unit.step("parse");
///     if request % 2 == 0 {
///         // serve from cache
///         unit.step("cache hit");
///     } else {
///         // query the database
///         unit.step("query");
///     }
///     unit.end();
/// }
///
/// // One log line per unit; empties the profiler.
/// let mut lines = Vec::new();
/// profiler.dump_to(&mut lines).unwrap();
/// assert_eq!(String::from_utf8(lines).unwrap().lines().count(), 10);
/// assert!(profiler.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct Profiler {
    state: Arc<ProfilerState>,
}

/// State shared by a profiler, its clones and its active units.
#[derive(derive_more::Debug)]
pub(crate) struct ProfilerState {
    enabled: AtomicBool,
    gate: ArcSwap<Gate>,
    registry: Registry,
    #[debug(ignore)]
    sink: Mutex<Sink>,
    platform: PlatformFacade,
}

impl ProfilerState {
    pub(crate) fn new(enabled: bool, gate: Gate, sink: Sink, platform: PlatformFacade) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            gate: ArcSwap::from_pointee(gate),
            registry: Registry::default(),
            sink: Mutex::new(sink),
            platform,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub(crate) fn platform(&self) -> &PlatformFacade {
        &self.platform
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    fn sink(&self) -> MutexGuard<'_, Sink> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Profiler {
    /// Creates an enabled profiler that profiles every unit and reports to stdout.
    ///
    /// Use [`builder()`](Self::builder) for any other starting configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a new profiler.
    ///
    /// # Examples
    ///
    /// ```
    /// use step_profiler::{Gate, Profiler};
    ///
    /// let profiler = Profiler::builder()
    ///     .enabled(false)
    ///     .gate(Gate::sampled(0.01).unwrap())
    ///     .sink(std::io::stderr())
    ///     .build();
    ///
    /// assert!(!profiler.is_enabled());
    /// ```
    pub fn builder() -> ProfilerBuilder {
        ProfilerBuilder::new()
    }

    pub(crate) fn from_state(state: ProfilerState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self::builder().platform(platform).build()
    }

    /// Turns profiling on for this profiler and all its clones.
    pub fn enable(&self) {
        self.state.enabled.store(true, Ordering::Relaxed);
        tracing::debug!("profiler enabled");
    }

    /// Turns profiling off for this profiler and all its clones.
    ///
    /// While disabled, [`begin()`](Self::begin) hands out inactive units and units that are
    /// already active ignore every call until profiling is enabled again.
    pub fn disable(&self) {
        self.state.enabled.store(false, Ordering::Relaxed);
        tracing::debug!("profiler disabled");
    }

    /// Whether profiling is currently on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// Replaces the gate consulted by every subsequent [`begin()`](Self::begin).
    pub fn set_gate(&self, gate: Gate) {
        self.state.gate.store(Arc::new(gate));
        tracing::debug!("profiler gate replaced");
    }

    /// Replaces the writer that [`dump()`](Self::dump) and [`analyze()`](Self::analyze)
    /// write to.
    pub fn set_sink<W>(&self, sink: W)
    where
        W: Write + Send + 'static,
    {
        *self.state.sink() = Box::new(sink);
    }

    /// Begins timing a unit of work described by `description`.
    ///
    /// Returns an inactive unit, on which every call does nothing, if the profiler is
    /// disabled or the gate declines this unit.
    pub fn begin(&self, description: impl Into<String>) -> Unit {
        if !self.state.is_enabled() || !self.state.gate.load().allows() {
            return Unit::inactive();
        }

        Unit::start(Arc::clone(&self.state), description.into())
    }

    /// Number of ended units waiting to be reported.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.registry.len()
    }

    /// Whether no ended unit is waiting to be reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.registry.is_empty()
    }

    /// Takes every ended unit, in the order they were ended, leaving the profiler empty.
    #[must_use]
    pub fn drain(&self) -> Vec<CompletedUnit> {
        self.state.registry.drain()
    }

    /// Discards every ended unit without reporting it.
    pub fn reset(&self) {
        self.state.registry.reset();
    }

    /// Takes every ended unit and computes per-step statistics over them.
    #[must_use]
    pub fn summarize(&self) -> Summary {
        Summary::from_units(&self.drain())
    }

    /// Takes every ended unit and writes one log line per unit to the sink.
    ///
    /// Write failures are logged and otherwise ignored.
    pub fn dump(&self) {
        let units = self.drain();

        if let Err(error) = self.write_to_sink(|sink| write_log_lines(sink, &units)) {
            tracing::warn!(%error, units = units.len(), "failed to dump profiled units");
        }
    }

    /// Takes every ended unit and writes one log line per unit to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sink`](crate::Error::Sink) if `writer` fails. The units are
    /// drained either way.
    pub fn dump_to<W>(&self, writer: &mut W) -> Result<()>
    where
        W: Write + ?Sized,
    {
        write_log_lines(writer, &self.drain())?;
        Ok(())
    }

    /// Takes every ended unit and writes the statistical report to the sink.
    ///
    /// Write failures are logged and otherwise ignored.
    pub fn analyze(&self) {
        let summary = self.summarize();

        if let Err(error) = self.write_to_sink(|sink| write!(sink, "{summary}")) {
            tracing::warn!(%error, measures = summary.len(), "failed to write profiling report");
        }
    }

    /// Takes every ended unit and writes the statistical report to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sink`](crate::Error::Sink) if `writer` fails. The units are
    /// drained either way.
    pub fn analyze_to<W>(&self, writer: &mut W) -> Result<()>
    where
        W: Write + ?Sized,
    {
        write!(writer, "{}", self.summarize())?;
        Ok(())
    }

    fn write_to_sink(&self, write: impl FnOnce(&mut Sink) -> io::Result<()>) -> io::Result<()> {
        let mut sink = self.state.sink();
        write(&mut sink)?;
        sink.flush()
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}
