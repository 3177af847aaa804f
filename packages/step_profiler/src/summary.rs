//! Statistics over ended units, grouped by unit description and step tag.

use std::cmp;
use std::fmt::{self, Display, Write as _};

use foldhash::{HashMap, HashMapExt};

use crate::CompletedUnit;

/// Columns of the summary table are never narrower than this.
const MIN_COLUMN_WIDTH: usize = 5;

/// Space between adjacent columns of the summary table.
const COLUMN_GAP: &str = "  ";

/// Statistics of one step of one kind of unit, all durations in nanoseconds.
///
/// The key joins the unit description and the step tag with a slash,
/// e.g. `HandleRequest/parse`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Measure {
    key: String,
    count: u64,
    total: u64,
    mean: u64,
    min: u64,
    max: u64,
}

impl Measure {
    /// `description/tag` of the measured step.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of times the step was recorded.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of all recorded durations.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// `total / count`, rounded down.
    #[must_use]
    pub fn mean(&self) -> u64 {
        self.mean
    }

    /// Shortest recorded duration.
    #[must_use]
    pub fn min(&self) -> u64 {
        self.min
    }

    /// Longest recorded duration.
    #[must_use]
    pub fn max(&self) -> u64 {
        self.max
    }
}

/// One column of the summary table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Column {
    /// Number of recordings.
    Count,
    /// Sum of durations.
    Total,
    /// Mean duration.
    Mean,
    /// Shortest duration. Displayed but never used to rank measures.
    Min,
    /// Longest duration.
    Max,
}

impl Column {
    /// Every column, in display order.
    pub const ALL: [Self; 5] = [Self::Count, Self::Total, Self::Mean, Self::Min, Self::Max];

    /// The table header of the column.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Count => "Count",
            Self::Total => "Total",
            Self::Mean => "Mean",
            Self::Min => "Min",
            Self::Max => "Max",
        }
    }

    /// How the column is described in the `Sort by` line of a report section.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Max => "Maximum(100 Percentile)",
            other => other.name(),
        }
    }

    /// The value of this column for `measure`.
    #[must_use]
    pub fn value(self, measure: &Measure) -> u64 {
        match self {
            Self::Count => measure.count,
            Self::Total => measure.total,
            Self::Mean => measure.mean,
            Self::Min => measure.min,
            Self::Max => measure.max,
        }
    }

    /// Whether a report contains a section ranked by this column.
    #[must_use]
    pub fn is_sortable(self) -> bool {
        !matches!(self, Self::Min)
    }

    /// The column whose values decide this column's width.
    ///
    /// Min shares the width of Max, which is never narrower.
    fn width_source(self) -> Self {
        match self {
            Self::Min => Self::Max,
            other => other,
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-step statistics over a set of ended units.
///
/// The `Display` implementation renders the full text report: one table per sortable
/// [`Column`], each ranked by that column in descending order.
///
/// # Examples
///
/// ```
/// use step_profiler::{Column, Profiler};
///
/// let profiler = Profiler::new();
///
/// for _ in 0..3 {
///     let mut unit = profiler.begin("HandleRequest");
///     unit.step("parse");
///     unit.end();
/// }
///
/// let summary = profiler.summarize();
/// let parse = summary.get("HandleRequest/parse").unwrap();
/// assert_eq!(parse.count(), 3);
///
/// let slowest_first = summary.sorted_by(Column::Total);
/// println!("{summary}");
/// # assert_eq!(slowest_first.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    // Sorted by key, ascending.
    measures: Vec<Measure>,
}

#[derive(Debug, Default)]
struct Accumulator {
    durations: Vec<u64>,
    total: u64,
}

impl Summary {
    /// Groups every step of every unit by `description/tag` and computes the statistics
    /// of each group.
    #[must_use]
    pub fn from_units(units: &[CompletedUnit]) -> Self {
        let mut groups: HashMap<String, Accumulator> = HashMap::new();

        for unit in units {
            for (tag, nanos) in unit.steps().iter() {
                let group = groups
                    .entry(format!("{}/{tag}", unit.description()))
                    .or_default();

                group.durations.push(nanos);
                group.total = group.total.saturating_add(nanos);
            }
        }

        let mut measures = groups
            .into_iter()
            .map(|(key, mut group)| {
                group.durations.sort_unstable();

                let count = u64::try_from(group.durations.len())
                    .expect("a group never holds more than u64::MAX durations");

                Measure {
                    key,
                    count,
                    total: group.total,
                    mean: group
                        .total
                        .checked_div(count)
                        .expect("every group has at least one duration"),
                    min: *group
                        .durations
                        .first()
                        .expect("every group has at least one duration"),
                    max: *group
                        .durations
                        .last()
                        .expect("every group has at least one duration"),
                }
            })
            .collect::<Vec<_>>();

        measures.sort_by(|a, b| a.key.cmp(&b.key));

        Self { measures }
    }

    /// Iterates over the measures in ascending key order.
    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.measures.iter()
    }

    /// The measure with the given `description/tag` key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Measure> {
        let index = self
            .measures
            .binary_search_by(|measure| measure.key.as_str().cmp(key))
            .ok()?;

        self.measures.get(index)
    }

    /// Number of distinct `description/tag` groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.measures.len()
    }

    /// Whether no step was recorded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    /// The measures ranked by `column`, largest value first.
    ///
    /// Measures with equal values stay in ascending key order.
    #[must_use]
    pub fn sorted_by(&self, column: Column) -> Vec<&Measure> {
        let mut sorted = self.measures.iter().collect::<Vec<_>>();
        sorted.sort_by_key(|measure| cmp::Reverse(column.value(measure)));
        sorted
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_report(self, &Column::ALL))
    }
}

/// Number of decimal digits needed to print `value`.
fn digit_width(value: u64) -> usize {
    value
        .checked_ilog10()
        .map_or(1, |log| {
            usize::try_from(log)
                .expect("u64 has at most 20 digits")
                .saturating_add(1)
        })
}

/// Renders `measures` as a right-aligned table in the given order, followed by the
/// measure key as a trailing `Description` column.
///
/// All five columns are always shown. Each column is as wide as its widest value but
/// at least five characters.
#[must_use]
pub fn render_table(measures: &[&Measure]) -> String {
    let widths = Column::ALL.map(|column| {
        measures
            .iter()
            .map(|measure| digit_width(column.width_source().value(measure)))
            .fold(MIN_COLUMN_WIDTH, cmp::max)
    });

    let mut table = String::new();

    for (column, width) in Column::ALL.iter().zip(widths) {
        write!(table, "{:>width$}{COLUMN_GAP}", column.name())
            .expect("we expect writing to String to be infallible");
    }
    table.push_str("Description\n");

    for measure in measures {
        for (column, width) in Column::ALL.iter().zip(widths) {
            write!(table, "{:>width$}{COLUMN_GAP}", column.value(measure))
                .expect("we expect writing to String to be infallible");
        }
        table.push_str(&measure.key);
        table.push('\n');
    }

    table
}

/// Renders one section per sortable column in `columns`: a `Sort by` line, the table
/// ranked by that column and a blank line.
#[must_use]
pub fn render_report(summary: &Summary, columns: &[Column]) -> String {
    let mut report = String::new();

    for column in columns.iter().filter(|column| column.is_sortable()) {
        writeln!(report, "Sort by {}", column.title())
            .expect("we expect writing to String to be infallible");
        report.push_str(&render_table(&summary.sorted_by(*column)));
        report.push('\n');
    }

    report
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::indexing_slicing, reason = "panic is fine in tests")]

    use super::*;

    fn summary_of(units: &[CompletedUnit]) -> Summary {
        Summary::from_units(units)
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        let summary = summary_of(&[]);

        assert!(summary.is_empty());
        assert_eq!(summary.len(), 0);
    }

    #[test]
    fn aggregates_one_key_across_units() {
        let durations = [7_u64, 3, 10, 4];
        let units = durations
            .iter()
            .map(|nanos| CompletedUnit::fake("X", &[("s", *nanos)], &[]))
            .collect::<Vec<_>>();

        let summary = summary_of(&units);

        assert_eq!(summary.len(), 1);
        let measure = summary.get("X/s").unwrap();
        assert_eq!(measure.key(), "X/s");
        assert_eq!(measure.count(), 4);
        assert_eq!(measure.total(), 24);
        assert_eq!(measure.mean(), 6);
        assert_eq!(measure.min(), 3);
        assert_eq!(measure.max(), 10);
    }

    #[test]
    fn mean_truncates() {
        let units = [
            CompletedUnit::fake("X", &[("s", 1)], &[]),
            CompletedUnit::fake("X", &[("s", 2)], &[]),
        ];

        assert_eq!(summary_of(&units).get("X/s").unwrap().mean(), 1);
    }

    #[test]
    fn groups_by_description_and_tag() {
        let units = [
            CompletedUnit::fake("A", &[("s", 1), ("t", 2)], &[]),
            CompletedUnit::fake("B", &[("s", 3)], &[]),
            CompletedUnit::fake("A", &[("s", 5)], &[]),
        ];

        let summary = summary_of(&units);

        assert_eq!(
            summary.measures().map(Measure::key).collect::<Vec<_>>(),
            vec!["A/s", "A/t", "B/s"]
        );
        assert_eq!(summary.get("A/s").unwrap().count(), 2);
        assert_eq!(summary.get("A/t").unwrap().count(), 1);
        assert_eq!(summary.get("B/s").unwrap().total(), 3);
        assert!(summary.get("B/t").is_none());
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let units = [
            CompletedUnit::fake("X", &[("s", u64::MAX)], &[]),
            CompletedUnit::fake("X", &[("s", 10)], &[]),
        ];

        let measure = summary_of(&units).get("X/s").unwrap().clone();

        assert_eq!(measure.total(), u64::MAX);
        assert_eq!(measure.max(), u64::MAX);
    }

    fn mixed_summary() -> Summary {
        summary_of(&[
            CompletedUnit::fake("A", &[("fast", 1), ("slow", 900)], &[]),
            CompletedUnit::fake("A", &[("fast", 3), ("slow", 100)], &[]),
            CompletedUnit::fake("A", &[("fast", 2)], &[]),
            CompletedUnit::fake("B", &[("once", 5000)], &[]),
        ])
    }

    #[test]
    fn sorted_by_is_descending_for_every_sortable_column() {
        let summary = mixed_summary();

        for column in Column::ALL {
            let sorted = summary.sorted_by(column);
            assert_eq!(sorted.len(), summary.len());

            for pair in sorted.windows(2) {
                assert!(
                    column.value(pair[0]) >= column.value(pair[1]),
                    "{column} not descending"
                );
            }
        }
    }

    #[test]
    fn sorted_by_keeps_key_order_on_ties() {
        let summary = summary_of(&[
            CompletedUnit::fake("C", &[("s", 1)], &[]),
            CompletedUnit::fake("A", &[("s", 1)], &[]),
            CompletedUnit::fake("B", &[("s", 1)], &[]),
        ]);

        assert_eq!(
            summary
                .sorted_by(Column::Count)
                .into_iter()
                .map(Measure::key)
                .collect::<Vec<_>>(),
            vec!["A/s", "B/s", "C/s"]
        );
    }

    #[test]
    fn digit_width_counts_digits() {
        assert_eq!(digit_width(0), 1);
        assert_eq!(digit_width(1), 1);
        assert_eq!(digit_width(9), 1);
        assert_eq!(digit_width(10), 2);
        assert_eq!(digit_width(99_999), 5);
        assert_eq!(digit_width(100_000), 6);
        assert_eq!(digit_width(u64::MAX), 20);
    }

    #[test]
    fn table_uses_minimum_width() {
        let summary = summary_of(&[CompletedUnit::fake("X", &[("s", 7)], &[])]);

        let table = render_table(&summary.sorted_by(Column::Count));

        assert_eq!(
            table,
            "Count  Total   Mean    Min    Max  Description\n    1      7      7      7      7  X/s\n"
        );
    }

    #[test]
    fn table_widens_to_fit_values() {
        let summary = summary_of(&[
            CompletedUnit::fake("X", &[("s", 1_234_567)], &[]),
            CompletedUnit::fake("X", &[("s", 1)], &[]),
        ]);

        let table = render_table(&summary.sorted_by(Column::Total));
        let lines = table.lines().collect::<Vec<_>>();

        // Total 1234568, Mean 617284, Max 1234567; Min is as wide as Max.
        assert_eq!(
            lines[0],
            "Count    Total    Mean      Min      Max  Description"
        );
        assert_eq!(
            lines[1],
            "    2  1234568  617284        1  1234567  X/s"
        );
    }

    #[test]
    fn table_without_measures_has_only_header() {
        assert_eq!(
            render_table(&[]),
            "Count  Total   Mean    Min    Max  Description\n"
        );
    }

    #[test]
    fn report_has_one_section_per_sortable_column() {
        let report = render_report(&mixed_summary(), &Column::ALL);

        let headings = report
            .lines()
            .filter(|line| line.starts_with("Sort by "))
            .collect::<Vec<_>>();

        assert_eq!(
            headings,
            vec![
                "Sort by Count",
                "Sort by Total",
                "Sort by Mean",
                "Sort by Maximum(100 Percentile)"
            ]
        );

        // Each section ends with a blank line.
        assert_eq!(report.matches("\n\n").count(), 4);
        assert!(report.ends_with("\n\n"));
    }

    #[test]
    fn report_sections_follow_requested_columns() {
        let report = render_report(&mixed_summary(), &[Column::Min, Column::Total]);

        assert!(report.starts_with("Sort by Total\n"));
        assert_eq!(report.matches("Sort by").count(), 1);
    }

    #[test]
    fn report_section_is_ranked_by_its_column() {
        let report = render_report(&mixed_summary(), &[Column::Total]);
        let rows = report
            .lines()
            .skip(2)
            .take_while(|line| !line.is_empty())
            .collect::<Vec<_>>();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].ends_with("B/once"));
        assert!(rows[1].ends_with("A/slow"));
        assert!(rows[2].ends_with("A/fast"));
    }

    #[test]
    fn display_matches_full_report() {
        let summary = mixed_summary();

        assert_eq!(summary.to_string(), render_report(&summary, &Column::ALL));
    }

    #[test]
    fn column_titles() {
        assert_eq!(Column::Max.title(), "Maximum(100 Percentile)");
        assert_eq!(Column::Count.title(), "Count");
        assert_eq!(Column::Min.to_string(), "Min");
        assert!(!Column::Min.is_sortable());
        assert!(Column::ALL.iter().filter(|c| c.is_sortable()).count() == 4);
    }
}
