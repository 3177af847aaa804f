//! Raw per-unit log lines.
//!
//! Each ended unit becomes one tab-separated line:
//!
//! ```text
//! log:MP<TAB>parse:1200<TAB>query:53000<TAB>Last Step to End:800<TAB>description:HandleRequest<TAB>memo:user=42,retry
//! ```
//!
//! Log processors downstream split on the tab character, which is why memos are stripped of
//! tabs, line breaks and commas before they are stored.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::CompletedUnit;

/// The first field of every log line.
pub const LOG_LINE_MARKER: &str = "log:MP";

const FIELD_SEPARATOR: char = '\t';

/// Renders one unit as a log line, without the trailing newline.
///
/// # Examples
///
/// ```
/// use step_profiler::{Profiler, render_log_line};
///
/// let profiler = Profiler::new();
/// let mut unit = profiler.begin("job");
/// unit.step("a");
/// unit.end();
///
/// for unit in profiler.drain() {
///     let line = render_log_line(&unit);
///     assert!(line.starts_with("log:MP\ta:"));
///     assert!(line.ends_with("\tdescription:job\tmemo:"));
/// }
/// ```
#[must_use]
pub fn render_log_line(unit: &CompletedUnit) -> String {
    let mut line = String::from(LOG_LINE_MARKER);

    for (tag, nanos) in unit.steps().iter() {
        write!(line, "{FIELD_SEPARATOR}{tag}:{nanos}")
            .expect("we expect writing to String to be infallible");
    }

    write!(line, "{FIELD_SEPARATOR}description:{}", unit.description())
        .expect("we expect writing to String to be infallible");

    write!(line, "{FIELD_SEPARATOR}memo:{}", unit.memos().join(","))
        .expect("we expect writing to String to be infallible");

    line
}

/// Writes one log line per unit, each terminated by a newline.
///
/// # Errors
///
/// Returns any error reported by `writer`.
pub fn write_log_lines<W>(writer: &mut W, units: &[CompletedUnit]) -> io::Result<()>
where
    W: Write + ?Sized,
{
    for unit in units {
        writeln!(writer, "{}", render_log_line(unit))?;
    }

    Ok(())
}
