#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Step timing for units of work, with raw log dumps and per-step summary statistics.
//!
//! Begin a [`Unit`] when a logical operation starts, call [`Unit::step()`] at every
//! interesting checkpoint and [`Unit::end()`] when the operation is done. Each step records
//! the time since the previous checkpoint, not since the unit began. Ended units accumulate
//! in the [`Profiler`] until you report on them.
//!
//! ```
//! use step_profiler::Profiler;
//!
//! let profiler = Profiler::new();
//!
//! let mut unit = profiler.begin("HandleRequest");
//! // parse the request
//! unit.step("parse");
//! // talk to the database
//! unit.step("query");
//! unit.memo("user=42");
//! unit.end();
//! ```
//!
//! # Reporting
//!
//! Two reports are available and both take (drain) every ended unit from the profiler:
//!
//! * [`Profiler::dump()`] writes one tab-separated log line per unit, for log processors:
//!
//!   ```text
//!   log:MP<TAB>parse:1200<TAB>query:53000<TAB>Last Step to End:800<TAB>description:HandleRequest<TAB>memo:user=42
//!   ```
//!
//! * [`Profiler::analyze()`] writes count, total, mean, min and max per
//!   `description/step` pair, once ranked by each of count, total, mean and max:
//!
//!   ```text
//!   Sort by Total
//!   Count   Total   Mean    Min    Max  Description
//!       2  108000  54000  53000  55000  HandleRequest/query
//!       2    2500   1250   1200   1300  HandleRequest/parse
//!       2    1600    800    800    800  HandleRequest/Last Step to End
//!   ```
//!
//! All durations are in nanoseconds. Output goes to stdout unless another sink is
//! configured; [`Profiler::dump_to()`] and [`Profiler::analyze_to()`] write to a writer of
//! your choice instead, and [`Profiler::drain()`] / [`Profiler::summarize()`] give access
//! to the data itself.
//!
//! # Turning profiling off
//!
//! Instrumentation never fails and never panics. When a profiler is disabled, or its
//! [`Gate`] declines a unit, [`Profiler::begin()`] returns an inactive unit on which
//! every call does nothing, so instrumented code can stay in place at near-zero cost:
//!
//! ```
//! use step_profiler::{Gate, Profiler};
//!
//! let profiler = Profiler::new();
//!
//! // Profile roughly 1% of units.
//! profiler.set_gate(Gate::sampled(0.01).unwrap());
//!
//! profiler.disable();
//! let mut unit = profiler.begin("HandleRequest");
//! unit.step("parse");
//! unit.end();
//!
//! assert!(profiler.is_empty());
//! ```
//!
//! # Threading
//!
//! A [`Profiler`] is a cheap handle that can be cloned into any number of threads or tasks;
//! all clones feed the same set of ended units. Each [`Unit`] belongs to one thread or task
//! at a time. Independent profilers can coexist in one process.

mod dump;
mod error;
mod gate;
mod memo;
mod pal;
mod profiler;
mod profiler_builder;
mod registry;
mod summary;
mod unit;

pub use dump::*;
pub use error::*;
pub use gate::*;
pub use memo::*;
pub use profiler::Profiler;
pub use profiler_builder::*;
pub use summary::*;
pub use unit::*;
