//! Two-selection comparison dashboard.
//!
//! [`Dashboard::render`] never fails on missing or malformed inputs: each
//! problem becomes a warning or a panel message and the rest still renders.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use mediadash_core::AppConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{CacheStats, TableCache};
use crate::chart::{entity_bars, section_pie};
use crate::discovery::{find_topic_file, scan_sentiment_catalog, topic_source, SentimentCatalog};
use crate::entities::{
    compare_entities, EntityComparison, EntityOutcome, EntityStopwords, SourceInput, SourceKey,
};
use crate::error::AnalyticsError;
use crate::filter::DateRange;
use crate::loader::{SentimentTable, TopicTable};
use crate::topics::{apply_threshold, section_distribution, SectionShare};

pub const DEFAULT_THRESHOLD: f64 = 2.0;
pub const MAX_THRESHOLD: f64 = 20.0;

/// One outlet/platform pick with optional date bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub outlet: String,
    pub platform: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Selection {
    #[must_use]
    pub fn new(outlet: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            outlet: outlet.into(),
            platform: platform.into(),
            start: None,
            end: None,
        }
    }

    #[must_use]
    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    #[must_use]
    pub fn source_key(&self) -> SourceKey {
        SourceKey::new(&self.outlet, &self.platform)
    }

    /// Filter range; open bounds extend to the end of the calendar.
    fn range(&self) -> Result<DateRange, AnalyticsError> {
        DateRange::new(
            self.start.unwrap_or(NaiveDate::MIN),
            self.end.unwrap_or(NaiveDate::MAX),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub selections: [Selection; 2],
    /// Minimum pie slice percentage, 0–20.
    pub threshold: f64,
}

impl DashboardRequest {
    #[must_use]
    pub fn new(first: Selection, second: Selection) -> Self {
        Self {
            selections: [first, second],
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidRequest`] when the threshold is out
    /// of range or a selection's start is after its end.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if !(0.0..=MAX_THRESHOLD).contains(&self.threshold) {
            return Err(AnalyticsError::InvalidRequest(format!(
                "threshold must be between 0 and {MAX_THRESHOLD}, got {}",
                self.threshold
            )));
        }
        for selection in &self.selections {
            selection.range()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicPanel {
    pub outlet: String,
    pub platform: String,
    /// Date span of the loaded topic file.
    pub available: Option<DateRange>,
    /// Slices at or above the threshold.
    pub shares: Vec<SectionShare>,
    pub chart: Option<Value>,
    pub message: Option<String>,
}

impl TopicPanel {
    fn empty(selection: &Selection, message: String) -> Self {
        Self {
            outlet: selection.outlet.clone(),
            platform: selection.platform.clone(),
            available: None,
            shares: Vec::new(),
            chart: None,
            message: Some(message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityPanel {
    pub comparison: Option<EntityComparison>,
    pub chart: Option<Value>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub topics: Vec<TopicPanel>,
    pub entities: EntityPanel,
    pub warnings: Vec<String>,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformSummary {
    pub platform: String,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
    pub has_entity_column: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutletSummary {
    pub outlet: String,
    pub platforms: Vec<PlatformSummary>,
}

#[derive(Debug)]
pub struct Dashboard {
    data_root: PathBuf,
    sentiment_root: PathBuf,
    stopwords: EntityStopwords,
    cache: TableCache,
}

impl Dashboard {
    #[must_use]
    pub fn new(data_root: impl Into<PathBuf>, sentiment_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            sentiment_root: sentiment_root.into(),
            stopwords: EntityStopwords::default(),
            cache: TableCache::new(),
        }
    }

    /// Dashboard over the configured roots, excluding the default stopwords
    /// plus `MEDIADASH_EXTRA_STOPWORDS`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.data_root.clone(), config.sentiment_root.clone())
            .with_extra_stopwords(&config.extra_stopwords)
    }

    /// Adds entities to exclude on top of the current stopwords.
    #[must_use]
    pub fn with_extra_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords.extend(words);
        self
    }

    #[must_use]
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    #[must_use]
    pub fn sentiment_root(&self) -> &Path {
        &self.sentiment_root
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        tracing::info!("dashboard table cache cleared");
    }

    /// Outlets with at least one usable sentiment file, sorted, each with
    /// its platforms and their date spans.
    ///
    /// Unreadable files are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Io`] if the sentiment root cannot be listed.
    pub fn outlets(&mut self) -> Result<Vec<OutletSummary>, AnalyticsError> {
        let catalog = scan_sentiment_catalog(&self.sentiment_root)?;
        let mut summaries = Vec::new();

        for outlet in catalog.outlets() {
            let mut platforms = Vec::new();
            for (platform, path) in catalog.platforms(outlet) {
                let table = match self.cache.sentiment_table(&self.sentiment_root, outlet, path) {
                    Ok(table) => table,
                    Err(e) => {
                        tracing::warn!(outlet, platform, error = %e, "skipping sentiment file");
                        continue;
                    }
                };
                if let Some(table) = table.as_ref() {
                    platforms.push(PlatformSummary {
                        platform: platform.to_string(),
                        first: table.first,
                        last: table.last,
                        has_entity_column: table.has_entity_column,
                    });
                }
            }
            if !platforms.is_empty() {
                summaries.push(OutletSummary {
                    outlet: outlet.to_string(),
                    platforms,
                });
            }
        }

        Ok(summaries)
    }

    /// Builds both topic panels and the entity comparison for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidRequest`] if `request` fails
    /// validation. Missing or unreadable data never errors.
    pub fn render(&mut self, request: &DashboardRequest) -> Result<DashboardView, AnalyticsError> {
        request.validate()?;
        let mut warnings = Vec::new();

        let topics = request
            .selections
            .iter()
            .map(|selection| self.topic_panel(selection, request.threshold, &mut warnings))
            .collect::<Result<Vec<_>, _>>()?;

        let entities = self.entity_panel(&request.selections, &mut warnings)?;

        Ok(DashboardView {
            topics,
            entities,
            warnings,
            threshold: request.threshold,
        })
    }

    fn topic_panel(
        &mut self,
        selection: &Selection,
        threshold: f64,
        warnings: &mut Vec<String>,
    ) -> Result<TopicPanel, AnalyticsError> {
        let (outlet, platform) = (selection.outlet.as_str(), selection.platform.as_str());
        let no_data = format!("No topic data found for {outlet} on {platform}.");

        let table = match self.load_topic_table(outlet, platform) {
            Ok(Some(table)) if table.is_usable() => table,
            Ok(_) => {
                warnings.push(no_data.clone());
                return Ok(TopicPanel::empty(selection, no_data));
            }
            Err(e) => {
                tracing::warn!(outlet, platform, error = %e, "failed to load topic file");
                warnings.push(format!("{no_data} ({e})"));
                return Ok(TopicPanel::empty(selection, no_data));
            }
        };

        let range = selection.range()?;
        let distribution = section_distribution(&table, Some(&range));
        let mut panel = TopicPanel {
            available: table.date_range(),
            ..TopicPanel::empty(selection, String::new())
        };
        if distribution.is_empty() {
            panel.message = Some(format!(
                "No data in selected range for {outlet} on {platform}"
            ));
            return Ok(panel);
        }

        panel.shares = apply_threshold(distribution, threshold);
        if panel.shares.is_empty() {
            panel.message = Some(format!("No sections at or above {threshold}%"));
        } else {
            panel.message = None;
            panel.chart = Some(section_pie(&format!("{outlet} - {platform}"), &panel.shares));
        }
        Ok(panel)
    }

    fn load_topic_table(
        &mut self,
        outlet: &str,
        platform: &str,
    ) -> Result<Option<Arc<TopicTable>>, AnalyticsError> {
        let Some(source) = topic_source(platform) else {
            return Ok(None);
        };
        let Some(path) = find_topic_file(&self.data_root, outlet, platform)? else {
            return Ok(None);
        };
        self.cache
            .topic_table(&self.data_root, outlet, &path, source.date_column)
            .map(Some)
    }

    fn entity_panel(
        &mut self,
        selections: &[Selection],
        warnings: &mut Vec<String>,
    ) -> Result<EntityPanel, AnalyticsError> {
        let catalog = match scan_sentiment_catalog(&self.sentiment_root) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "failed to scan sentiment root");
                warnings.push(format!("Sentiment data unavailable ({e})."));
                SentimentCatalog::default()
            }
        };

        let mut loaded: Vec<(SourceKey, Option<Arc<Option<SentimentTable>>>, DateRange)> =
            Vec::with_capacity(selections.len());
        for selection in selections {
            let table = self.load_sentiment_table(&catalog, selection);
            if table.as_deref().is_none_or(Option::is_none) {
                warnings.push(format!(
                    "No data for {} on {}.",
                    selection.outlet, selection.platform
                ));
            }
            loaded.push((selection.source_key(), table, selection.range()?));
        }

        let inputs: Vec<SourceInput<'_>> = loaded
            .iter()
            .map(|(source, table, range)| SourceInput {
                source,
                table: table.as_deref().and_then(Option::as_ref),
                range: Some(range),
            })
            .collect();

        Ok(match compare_entities(&inputs, &self.stopwords) {
            EntityOutcome::Compared(comparison) => EntityPanel {
                chart: Some(entity_bars(&comparison)),
                comparison: Some(comparison),
                message: None,
            },
            EntityOutcome::NoEntityColumn => EntityPanel {
                message: Some("No 'entity' column found in datasets.".to_string()),
                ..EntityPanel::default()
            },
            EntityOutcome::NoData => EntityPanel {
                message: Some("No sentiment data for the selected outlets.".to_string()),
                ..EntityPanel::default()
            },
        })
    }

    fn load_sentiment_table(
        &mut self,
        catalog: &SentimentCatalog,
        selection: &Selection,
    ) -> Option<Arc<Option<SentimentTable>>> {
        let path = catalog.path(&selection.outlet, &selection.platform)?;
        match self
            .cache
            .sentiment_table(&self.sentiment_root, &selection.outlet, path)
        {
            Ok(table) => Some(table),
            Err(e) => {
                tracing::warn!(
                    outlet = %selection.outlet,
                    platform = %selection.platform,
                    error = %e,
                    "failed to load sentiment file"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn validate_rejects_threshold_out_of_range() {
        let mut request =
            DashboardRequest::new(Selection::new("cnn", "youtube"), Selection::new("fox", "twitter"));
        assert!(request.validate().is_ok());
        request.threshold = 20.5;
        assert!(request.validate().is_err());
        request.threshold = -1.0;
        assert!(request.validate().is_err());
        request.threshold = f64::NAN;
        assert!(request.validate().is_err());
    }

    #[test]
    fn validate_rejects_reversed_dates() {
        let request = DashboardRequest::new(
            Selection::new("cnn", "youtube").between(Some(date(2025, 2, 1)), Some(date(2025, 1, 1))),
            Selection::new("fox", "twitter"),
        );
        assert!(matches!(
            request.validate(),
            Err(AnalyticsError::InvalidRequest(_))
        ));
    }

    #[test]
    fn open_bounds_cover_everything() {
        let range = Selection::new("cnn", "youtube").range().unwrap();
        assert!(range.contains(date(1970, 1, 1).and_hms_opt(0, 0, 0).unwrap()));
        assert!(range.contains(date(2999, 1, 1).and_hms_opt(0, 0, 0).unwrap()));
    }
}
