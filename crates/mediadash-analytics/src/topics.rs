//! Section distributions for the topic pie charts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::filter::DateRange;
use crate::loader::TopicTable;

/// One slice of a topic pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionShare {
    pub section: String,
    pub count: u64,
    /// Share of labelled rows in range, 0–100.
    pub percent: f64,
}

/// Percentage of in-range rows per section, largest first (ties by name).
///
/// Rows with a blank label are not counted. Empty when nothing is in range.
#[must_use]
pub fn section_distribution(table: &TopicTable, range: Option<&DateRange>) -> Vec<SectionShare> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    let mut total = 0_u64;

    for row in &table.rows {
        if range.is_some_and(|r| !r.contains(row.timestamp)) {
            continue;
        }
        if let Some(section) = row.section.as_deref() {
            *counts.entry(section).or_default() += 1;
            total += 1;
        }
    }

    let mut shares: Vec<SectionShare> = counts
        .into_iter()
        .map(|(section, count)| SectionShare {
            section: section.to_string(),
            count,
            percent: percent(count, total),
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.section.cmp(&b.section)));
    shares
}

/// Keeps slices at or above `threshold` percent.
#[must_use]
pub fn apply_threshold(shares: Vec<SectionShare>, threshold: f64) -> Vec<SectionShare> {
    shares.into_iter().filter(|s| s.percent >= threshold).collect()
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}
