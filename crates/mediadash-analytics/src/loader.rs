//! CSV loaders for topic and entity-sentiment tables.
//!
//! Rows whose date cell cannot be parsed are dropped; everything else about
//! a malformed row is tolerated.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::Serialize;

use crate::error::AnalyticsError;
use crate::filter::DateRange;
use crate::timestamp::parse_timestamp;

/// Preferred topic label column; `section` is the fallback.
pub const MERGED_SECTION_COLUMN: &str = "merged_section";
pub const SECTION_COLUMN: &str = "section";
pub const ENTITY_COLUMN: &str = "entity";
/// Sentiment date columns in order of preference.
pub const SENTIMENT_DATE_COLUMNS: [&str; 2] = ["created_at", "date"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicRow {
    pub timestamp: NaiveDateTime,
    /// `None` when the label cell is blank.
    pub section: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopicTable {
    /// Which column supplied [`TopicRow::section`]; `None` if neither exists.
    pub label_column: Option<String>,
    pub rows: Vec<TopicRow>,
    pub dropped_rows: usize,
}

impl TopicTable {
    /// Parses a topic CSV, keyed on `date_column`.
    ///
    /// A file without `date_column` yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`csv::Error`] if the header row cannot be read.
    pub fn from_reader<R: Read>(reader: R, date_column: &str) -> Result<Self, csv::Error> {
        let mut csv = reader_builder().from_reader(reader);
        let headers = csv.headers()?.clone();

        let Some(date_idx) = column_index(&headers, date_column) else {
            tracing::debug!(date_column, "topic file has no date column");
            return Ok(Self::default());
        };
        let label = [MERGED_SECTION_COLUMN, SECTION_COLUMN]
            .into_iter()
            .find_map(|name| column_index(&headers, name).map(|idx| (name, idx)));

        let mut table = Self {
            label_column: label.map(|(name, _)| name.to_string()),
            ..Self::default()
        };

        for record in csv.records() {
            let Ok(record) = record else {
                table.dropped_rows += 1;
                continue;
            };
            let Some(timestamp) = record.get(date_idx).and_then(parse_timestamp) else {
                table.dropped_rows += 1;
                continue;
            };
            let section = label
                .and_then(|(_, idx)| record.get(idx))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            table.rows.push(TopicRow { timestamp, section });
        }

        Ok(table)
    }

    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the file cannot be read or parsed.
    pub fn load(path: &Path, date_column: &str) -> Result<Self, AnalyticsError> {
        let bytes = std::fs::read(path).map_err(|e| AnalyticsError::io(path, e))?;
        let table = Self::from_reader(bytes.as_slice(), date_column).map_err(|source| {
            AnalyticsError::Csv {
                path: path.to_path_buf(),
                source,
            }
        })?;
        tracing::debug!(
            path = %path.display(),
            rows = table.rows.len(),
            dropped_rows = table.dropped_rows,
            "loaded topic table"
        );
        Ok(table)
    }

    /// Whether a section distribution can be computed at all.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.label_column.is_some() && !self.rows.is_empty()
    }

    #[must_use]
    pub fn date_range(&self) -> Option<DateRange> {
        DateRange::spanning(self.rows.iter().map(|r| r.timestamp))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRow {
    pub timestamp: NaiveDateTime,
    /// Raw entity cell; `None` when the column is absent or the cell empty.
    pub entity: Option<String>,
    /// Every other column, keyed by lower-cased header.
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentTable {
    pub has_entity_column: bool,
    pub rows: Vec<SentimentRow>,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

impl SentimentTable {
    /// Parses an entity-sentiment CSV. Headers are lower-cased.
    ///
    /// Returns `Ok(None)` when the file has no `created_at`/`date` column or
    /// no row with a parseable timestamp; such files are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`csv::Error`] if the header row cannot be read.
    pub fn from_reader<R: Read>(reader: R) -> Result<Option<Self>, csv::Error> {
        let mut csv = reader_builder().from_reader(reader);
        let headers: Vec<String> = csv
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let Some(date_idx) = SENTIMENT_DATE_COLUMNS
            .iter()
            .find_map(|name| headers.iter().position(|h| h == name))
        else {
            return Ok(None);
        };
        let entity_idx = headers.iter().position(|h| h == ENTITY_COLUMN);

        let mut rows = Vec::new();
        for record in csv.records() {
            let Ok(record) = record else { continue };
            let Some(timestamp) = record.get(date_idx).and_then(parse_timestamp) else {
                continue;
            };
            let entity = entity_idx
                .and_then(|idx| record.get(idx))
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let fields = headers
                .iter()
                .zip(record.iter())
                .enumerate()
                .filter(|(idx, _)| *idx != date_idx && Some(*idx) != entity_idx)
                .map(|(_, (h, v))| (h.clone(), v.to_string()))
                .collect();
            rows.push(SentimentRow {
                timestamp,
                entity,
                fields,
            });
        }

        let Some(first) = rows.iter().map(|r| r.timestamp).min() else {
            return Ok(None);
        };
        let last = rows.iter().map(|r| r.timestamp).max().unwrap_or(first);

        Ok(Some(Self {
            has_entity_column: entity_idx.is_some(),
            rows,
            first,
            last,
        }))
    }

    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>, AnalyticsError> {
        let bytes = std::fs::read(path).map_err(|e| AnalyticsError::io(path, e))?;
        Self::from_reader(bytes.as_slice()).map_err(|source| AnalyticsError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn date_range(&self) -> DateRange {
        DateRange::between(self.first, self.last)
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.flexible(true).has_headers(true);
    builder
}

/// Exact header match first, then ASCII case-insensitive.
fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .or_else(|| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)))
}
