//! Annotation sanitizing.

/// Characters that would break the tab-delimited log line or the comma-joined memo list.
const FORBIDDEN_CHARS: [char; 4] = [',', '\t', '\r', '\n'];

/// Removes every comma, tab, carriage return and line feed from `text`,
/// keeping all other characters in their original order.
///
/// # Examples
///
/// ```
/// use step_profiler::sanitize_memo;
///
/// assert_eq!(sanitize_memo("user=42,\tretry\r\n"), "user=42retry");
/// ```
#[must_use]
pub fn sanitize_memo(text: &str) -> String {
    text.chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .collect()
}
