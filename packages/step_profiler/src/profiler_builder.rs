use std::io::{self, Write};

use crate::pal::PlatformFacade;
use crate::profiler::{ProfilerState, Sink};
use crate::{Gate, Profiler};

/// Configures a [`Profiler`] before creating it.
///
/// Every setting can also be changed later on the profiler itself; the builder only
/// decides the starting point.
///
/// # Examples
///
/// ```
/// use step_profiler::{Gate, Profiler};
///
/// let profiler = Profiler::builder()
///     .gate(Gate::from_fn(|| true))
///     .sink(Vec::new())
///     .build();
///
/// assert!(profiler.is_enabled());
/// ```
#[derive(derive_more::Debug)]
#[must_use]
pub struct ProfilerBuilder {
    enabled: bool,
    gate: Gate,
    #[debug(ignore)]
    sink: Option<Sink>,
    platform: PlatformFacade,
}

impl ProfilerBuilder {
    pub(crate) fn new() -> Self {
        Self {
            enabled: true,
            gate: Gate::always(),
            sink: None,
            platform: PlatformFacade::real(),
        }
    }

    /// Whether the profiler starts enabled. Defaults to `true`.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The gate consulted on every `begin()`. Defaults to [`Gate::always()`].
    pub fn gate(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    /// Where `dump()` and `analyze()` write. Defaults to stdout.
    pub fn sink<W>(mut self, sink: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.sink = Some(Box::new(sink));
        self
    }

    #[cfg(test)]
    pub(crate) fn platform(mut self, platform: PlatformFacade) -> Self {
        self.platform = platform;
        self
    }

    /// Creates the profiler.
    #[must_use]
    pub fn build(self) -> Profiler {
        let sink = self.sink.unwrap_or_else(|| Box::new(io::stdout()));

        Profiler::from_state(ProfilerState::new(
            self.enabled,
            self.gate,
            sink,
            self.platform,
        ))
    }
}
