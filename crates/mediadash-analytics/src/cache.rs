//! Content-addressed cache of parsed CSV tables.
//!
//! Entries are grouped by `(root, outlet)`. Each file is re-read on access
//! and re-parsed only when its SHA-256 digest changed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::AnalyticsError;
use crate::loader::{SentimentTable, TopicTable};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    root: PathBuf,
    outlet: String,
}

impl CacheKey {
    fn new(root: &Path, outlet: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            outlet: outlet.to_string(),
        }
    }
}

#[derive(Debug)]
struct Cached<T> {
    digest: [u8; 32],
    value: Arc<T>,
}

#[derive(Debug, Default)]
struct OutletEntry {
    topics: HashMap<PathBuf, Cached<TopicTable>>,
    sentiment: HashMap<PathBuf, Cached<Option<SentimentTable>>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Accesses served without parsing.
    pub hits: u64,
    /// Accesses that parsed the file.
    pub parses: u64,
}

#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<CacheKey, OutletEntry>,
    stats: CacheStats,
}

impl TableCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Topic table at `path`, parsed with `date_column`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the file cannot be read or parsed.
    pub fn topic_table(
        &mut self,
        root: &Path,
        outlet: &str,
        path: &Path,
        date_column: &str,
    ) -> Result<Arc<TopicTable>, AnalyticsError> {
        let entry = self.entries.entry(CacheKey::new(root, outlet)).or_default();
        fetch(&mut entry.topics, &mut self.stats, path, |bytes| {
            TopicTable::from_reader(bytes, date_column)
        })
    }

    /// Sentiment table at `path`; the inner `None` marks a skipped file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the file cannot be read or parsed.
    pub fn sentiment_table(
        &mut self,
        root: &Path,
        outlet: &str,
        path: &Path,
    ) -> Result<Arc<Option<SentimentTable>>, AnalyticsError> {
        let entry = self.entries.entry(CacheKey::new(root, outlet)).or_default();
        fetch(&mut entry.sentiment, &mut self.stats, path, |bytes| {
            SentimentTable::from_reader(bytes)
        })
    }

    /// Drops every table cached for `outlet` under `root`.
    pub fn invalidate(&mut self, root: &Path, outlet: &str) -> bool {
        self.entries.remove(&CacheKey::new(root, outlet)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of cached `(root, outlet)` groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fetch<T>(
    slot: &mut HashMap<PathBuf, Cached<T>>,
    stats: &mut CacheStats,
    path: &Path,
    parse: impl FnOnce(&[u8]) -> Result<T, csv::Error>,
) -> Result<Arc<T>, AnalyticsError> {
    let bytes = std::fs::read(path).map_err(|e| AnalyticsError::io(path, e))?;
    let digest: [u8; 32] = Sha256::digest(&bytes).into();

    if let Some(cached) = slot.get(path) {
        if cached.digest == digest {
            stats.hits += 1;
            return Ok(Arc::clone(&cached.value));
        }
        tracing::debug!(path = %path.display(), "file contents changed; reparsing");
    }

    let value = Arc::new(parse(&bytes).map_err(|source| AnalyticsError::Csv {
        path: path.to_path_buf(),
        source,
    })?);
    stats.parses += 1;
    slot.insert(
        path.to_path_buf(),
        Cached {
            digest,
            value: Arc::clone(&value),
        },
    );
    Ok(value)
}
