//! Comparative media analytics over pre-computed per-outlet CSVs.
//!
//! Loads topic and entity-sentiment tables, normalizes their timestamps,
//! filters by date, and aggregates two outlet/platform selections into
//! pie-chart topic distributions and a side-by-side entity share
//! comparison. Charts are emitted as Vega-Lite JSON.

pub mod cache;
pub mod chart;
pub mod dashboard;
pub mod discovery;
pub mod entities;
pub mod error;
pub mod filter;
pub mod loader;
pub mod timestamp;
pub mod topics;

pub use cache::{CacheStats, TableCache};
pub use dashboard::{
    Dashboard, DashboardRequest, DashboardView, EntityPanel, OutletSummary, PlatformSummary,
    Selection, TopicPanel, DEFAULT_THRESHOLD, MAX_THRESHOLD,
};
pub use discovery::{find_topic_file, scan_sentiment_catalog, topic_source, SentimentCatalog};
pub use entities::{
    compare_entities, AggregatedShare, EntityComparison, EntityOutcome, EntityStopwords,
    SourceInput, SourceKey, TOP_N,
};
pub use error::AnalyticsError;
pub use filter::DateRange;
pub use loader::{SentimentRow, SentimentTable, TopicRow, TopicTable};
pub use timestamp::parse_timestamp;
pub use topics::{apply_threshold, section_distribution, SectionShare};
