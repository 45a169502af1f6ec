//! Entity share comparison between two outlet/platform sources.
//!
//! Counts entity mentions per source, keeps each source's top entities,
//! and pads the union so every source has a row for every axis entity.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::DateRange;
use crate::loader::SentimentTable;
use crate::topics::percent;

/// Entities kept per source before the union.
pub const TOP_N: usize = 10;

const DEFAULT_STOPWORDS: &[&str] = &[
    "unknown",
    "n/a",
    "none",
    "please provide the text",
    "i'm sorry",
    "example.com",
    "#cnn#",
    "a year",
    "ABC News",
    "@ABC News",
    "BBCNews",
    "MSNBC",
    "www.nbcnew.com/politics/tru",
    "@msnbc.com",
    "n't",
    "@NYTimes",
    "the Reuters World News",
];

/// `outlet_platform` identifier of one series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceKey(String);

impl SourceKey {
    #[must_use]
    pub fn new(outlet: &str, platform: &str) -> Self {
        Self(format!("{outlet}_{platform}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity denylist, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityStopwords(HashSet<String>);

impl EntityStopwords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .collect(),
        )
    }

    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.0.contains(&entity.to_lowercase())
    }

}

impl<S: AsRef<str>> Extend<S> for EntityStopwords {
    fn extend<I: IntoIterator<Item = S>>(&mut self, words: I) {
        self.0.extend(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
    }
}

impl Default for EntityStopwords {
    fn default() -> Self {
        Self::new(DEFAULT_STOPWORDS)
    }
}

/// One selection's sentiment data going into the comparison.
#[derive(Debug, Clone, Copy)]
pub struct SourceInput<'a> {
    pub source: &'a SourceKey,
    /// `None` when no sentiment file exists for the selection.
    pub table: Option<&'a SentimentTable>,
    pub range: Option<&'a DateRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedShare {
    pub source: SourceKey,
    pub entity: String,
    pub count: u64,
    pub total: u64,
    pub percent: f64,
}

impl AggregatedShare {
    fn padding(source: &SourceKey, entity: &str) -> Self {
        Self {
            source: source.clone(),
            entity: entity.to_string(),
            count: 0,
            total: 1,
            percent: 0.0,
        }
    }

    /// Whether this row was synthesized to complete the axis.
    #[must_use]
    pub fn is_padding(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityComparison {
    /// Distinct sources in selection order.
    pub sources: Vec<SourceKey>,
    /// Display order of entities on the x axis.
    pub entity_axis: Vec<String>,
    /// One row per (axis entity, source), ordered by axis then source.
    pub shares: Vec<AggregatedShare>,
    /// Counted mentions per source after exclusions.
    pub totals: BTreeMap<SourceKey, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntityOutcome {
    Compared(EntityComparison),
    /// None of the loaded tables carries an `entity` column.
    NoEntityColumn,
    /// No input had a sentiment table.
    NoData,
}

/// Builds the entity comparison across `inputs`.
///
/// A source listed twice is counted once, using its first input.
#[must_use]
pub fn compare_entities(inputs: &[SourceInput<'_>], stopwords: &EntityStopwords) -> EntityOutcome {
    let mut seen = HashSet::new();
    let unique: Vec<&SourceInput<'_>> = inputs.iter().filter(|i| seen.insert(i.source)).collect();

    let tables: Vec<&SentimentTable> = unique.iter().filter_map(|i| i.table).collect();
    if tables.is_empty() {
        return EntityOutcome::NoData;
    }
    if !tables.iter().any(|t| t.has_entity_column) {
        return EntityOutcome::NoEntityColumn;
    }

    let sources: Vec<SourceKey> = unique.iter().map(|i| i.source.clone()).collect();
    let mut counts: BTreeMap<SourceKey, BTreeMap<String, u64>> = BTreeMap::new();
    let mut totals: BTreeMap<SourceKey, u64> = BTreeMap::new();

    for input in &unique {
        let per_entity = counts.entry(input.source.clone()).or_default();
        let total = totals.entry(input.source.clone()).or_default();
        let Some(table) = input.table else { continue };

        for row in &table.rows {
            if input.range.is_some_and(|r| !r.contains(row.timestamp)) {
                continue;
            }
            let Some(entity) = row.entity.as_deref().map(str::trim) else {
                continue;
            };
            if entity.is_empty() || stopwords.contains(entity) {
                continue;
            }
            *per_entity.entry(entity.to_string()).or_default() += 1;
            *total += 1;
        }
    }

    let mut entity_axis: Vec<String> = Vec::new();
    for source in &sources {
        for entity in top_entities(&counts[source], TOP_N) {
            if !entity_axis.iter().any(|e| e == entity) {
                entity_axis.push(entity.to_string());
            }
        }
    }

    let mut shares = Vec::with_capacity(entity_axis.len() * sources.len());
    for entity in &entity_axis {
        for source in &sources {
            let count = counts[source].get(entity).copied().unwrap_or(0);
            if count == 0 {
                shares.push(AggregatedShare::padding(source, entity));
                continue;
            }
            let total = totals[source];
            shares.push(AggregatedShare {
                source: source.clone(),
                entity: entity.clone(),
                count,
                total,
                percent: percent(count, total),
            });
        }
    }

    tracing::debug!(
        sources = sources.len(),
        axis = entity_axis.len(),
        "entity comparison built"
    );

    EntityOutcome::Compared(EntityComparison {
        sources,
        entity_axis,
        shares,
        totals,
    })
}

/// Highest counts first; equal counts by entity name.
fn top_entities(counts: &BTreeMap<String, u64>, n: usize) -> Vec<&str> {
    let mut ranked: Vec<(&str, u64)> = counts.iter().map(|(e, c)| (e.as_str(), *c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().take(n).map(|(e, _)| e).collect()
}
