//! Timed units of work and their recorded steps.

use std::sync::Arc;
use std::time::Instant;

use foldhash::HashMap;

use crate::pal::Platform;
use crate::profiler::ProfilerState;
use crate::sanitize_memo;

/// Tag of the implicit checkpoint taken when a unit is ended.
pub const FINAL_STEP_TAG: &str = "Last Step to End";

/// The durations recorded by one unit, keyed by step tag.
///
/// Each tag appears at most once. Recording a tag again overwrites the earlier
/// duration in place, so iteration yields tags in the order they were first recorded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Steps {
    entries: Vec<(String, u64)>,

    // Tag to index in `entries`.
    slots: HashMap<String, usize>,
}

impl Steps {
    pub(crate) fn record(&mut self, tag: &str, nanos: u64) {
        if let Some(entry) = self
            .slots
            .get(tag)
            .and_then(|slot| self.entries.get_mut(*slot))
        {
            entry.1 = nanos;
            return;
        }

        self.slots.insert(tag.to_owned(), self.entries.len());
        self.entries.push((tag.to_owned(), nanos));
    }

    /// The duration recorded for `tag`, in nanoseconds.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<u64> {
        let slot = self.slots.get(tag)?;
        self.entries.get(*slot).map(|(_, nanos)| *nanos)
    }

    /// Iterates over `(tag, nanoseconds)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries
            .iter()
            .map(|(tag, nanos)| (tag.as_str(), *nanos))
    }

    /// Number of distinct tags recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no step has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A unit that has been ended and can no longer change.
///
/// Obtained from [`Profiler::drain()`](crate::Profiler::drain).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedUnit {
    description: String,
    steps: Steps,
    memos: Vec<String>,
}

impl CompletedUnit {
    /// The label the unit was begun with.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The recorded step durations, including [`FINAL_STEP_TAG`].
    #[must_use]
    pub fn steps(&self) -> &Steps {
        &self.steps
    }

    /// The sanitized memos, in the order they were attached.
    #[must_use]
    pub fn memos(&self) -> &[String] {
        &self.memos
    }

    #[cfg(test)]
    pub(crate) fn fake(description: &str, steps: &[(&str, u64)], memos: &[&str]) -> Self {
        let mut recorded = Steps::default();
        for (tag, nanos) in steps {
            recorded.record(tag, *nanos);
        }

        Self {
            description: description.to_owned(),
            steps: recorded,
            memos: memos.iter().map(|memo| sanitize_memo(memo)).collect(),
        }
    }
}

/// Handle to a unit of work being timed.
///
/// A unit is either active, in which case [`step()`](Self::step) records the time since the
/// previous checkpoint, or inactive, in which case every method does nothing. Units are
/// inactive when the profiler was disabled or the gate declined them at
/// [`begin()`](crate::Profiler::begin) time, and become inactive once [`end()`](Self::end)
/// hands them to the profiler.
///
/// A unit dropped without calling `end()` is discarded and never reported.
///
/// # Examples
///
/// ```
/// use step_profiler::Profiler;
///
/// let profiler = Profiler::new();
///
/// let mut unit = profiler.begin("HandleRequest");
/// // parse the request
/// unit.step("parse");
/// // query the database
/// unit.step("query");
/// unit.memo("user=42");
/// unit.end();
///
/// assert_eq!(profiler.len(), 1);
/// ```
#[derive(Debug)]
#[must_use = "a unit is only recorded once end() is called"]
pub struct Unit {
    active: Option<ActiveUnit>,
}

#[derive(Debug)]
struct ActiveUnit {
    state: Arc<ProfilerState>,
    description: String,
    steps: Steps,
    memos: Vec<String>,
    last_checkpoint: Instant,
}

impl Unit {
    pub(crate) fn inactive() -> Self {
        Self { active: None }
    }

    pub(crate) fn start(state: Arc<ProfilerState>, description: String) -> Self {
        let last_checkpoint = state.platform().now();

        Self {
            active: Some(ActiveUnit {
                state,
                description,
                steps: Steps::default(),
                memos: Vec::new(),
                last_checkpoint,
            }),
        }
    }

    /// Whether this unit is still recording.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Records the time elapsed since the previous checkpoint (or since the unit began)
    /// under `tag` and starts the next interval.
    ///
    /// Does nothing if the unit is inactive or the profiler is currently disabled.
    pub fn step(&mut self, tag: &str) {
        if let Some(unit) = self.recording() {
            unit.checkpoint(tag);
        }
    }

    /// Attaches a free-text note to the unit.
    ///
    /// Commas, tabs, carriage returns and line feeds are removed first, as they would
    /// break the log line format. Does nothing if the unit is inactive or the profiler
    /// is currently disabled.
    pub fn memo(&mut self, text: &str) {
        if let Some(unit) = self.recording() {
            unit.memos.push(sanitize_memo(text));
        }
    }

    /// Takes a final checkpoint tagged [`FINAL_STEP_TAG`] and hands the unit to the profiler.
    ///
    /// The unit is inactive afterwards. Does nothing if the unit is already inactive or the
    /// profiler is currently disabled (in which case the unit stays active).
    pub fn end(&mut self) {
        if self.recording().is_none() {
            return;
        }

        let Some(mut unit) = self.active.take() else {
            return;
        };

        unit.checkpoint(FINAL_STEP_TAG);

        tracing::trace!(description = %unit.description, steps = unit.steps.len(), "unit ended");

        let ActiveUnit {
            state,
            description,
            steps,
            memos,
            ..
        } = unit;

        state.registry().record(CompletedUnit {
            description,
            steps,
            memos,
        });
    }

    /// The active unit, if there is one and its profiler is enabled.
    fn recording(&mut self) -> Option<&mut ActiveUnit> {
        self.active
            .as_mut()
            .filter(|unit| unit.state.is_enabled())
    }
}

impl ActiveUnit {
    fn checkpoint(&mut self, tag: &str) {
        let now = self.state.platform().now();
        let elapsed = now.saturating_duration_since(self.last_checkpoint);

        self.steps
            .record(tag, u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX));
        self.last_checkpoint = now;
    }
}

impl Drop for Unit {
    #[cfg_attr(test, mutants::skip)] // Only emits a trace event, nothing observable to test.
    fn drop(&mut self) {
        if let Some(unit) = &self.active {
            tracing::trace!(description = %unit.description, "unit dropped without end(), discarding");
        }
    }
}
