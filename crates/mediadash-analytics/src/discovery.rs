//! Locating topic and sentiment CSVs on disk.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::AnalyticsError;

pub const TOPIC_FILE_SUFFIX: &str = "_with_sections.csv";
pub const SENTIMENT_FILE_MARKER: &str = "entities_sentiment_by_date";
const SENTIMENT_FILE_SUFFIX: &str = "_entities_sentiment_by_date.csv";

/// Where a platform's topic files live and which column dates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicSource {
    pub platform: &'static str,
    /// Relative to the data root.
    pub folder: &'static str,
    pub date_column: &'static str,
}

const TOPIC_SOURCES: [TopicSource; 4] = [
    TopicSource {
        platform: "TikTok",
        folder: "tiktok",
        date_column: "create_time",
    },
    TopicSource {
        platform: "Twitter",
        folder: "twitter",
        date_column: "date",
    },
    TopicSource {
        platform: "YouTube",
        folder: "codes/youtube",
        date_column: "publishedAt",
    },
    TopicSource {
        platform: "Bluesky",
        folder: "bluesky",
        date_column: "created_at",
    },
];

/// Case-insensitive lookup of a platform's topic layout.
#[must_use]
pub fn topic_source(platform: &str) -> Option<&'static TopicSource> {
    TOPIC_SOURCES
        .iter()
        .find(|s| s.platform.eq_ignore_ascii_case(platform.trim()))
}

/// First file (by name) in the platform's topic folder that starts with
/// `outlet` and ends with [`TOPIC_FILE_SUFFIX`].
///
/// Unknown platforms and missing folders give `Ok(None)`.
///
/// # Errors
///
/// Returns [`AnalyticsError::Io`] if an existing folder cannot be listed.
pub fn find_topic_file(
    data_root: &Path,
    outlet: &str,
    platform: &str,
) -> Result<Option<PathBuf>, AnalyticsError> {
    let Some(source) = topic_source(platform) else {
        tracing::debug!(platform, "no topic layout for platform");
        return Ok(None);
    };
    let folder = data_root.join(source.folder);
    let Some(names) = sorted_entries(&folder)? else {
        return Ok(None);
    };

    Ok(names
        .into_iter()
        .find(|name| name.starts_with(outlet) && name.ends_with(TOPIC_FILE_SUFFIX))
        .map(|name| folder.join(name)))
}

/// Platform name encoded in a sentiment file name, if it is one.
///
/// `cnn_youtube_entities_sentiment_by_date.csv` under outlet `cnn` gives
/// `youtube`.
#[must_use]
pub fn sentiment_platform(outlet: &str, file_name: &str) -> Option<String> {
    if !file_name.ends_with(".csv") || !file_name.contains(SENTIMENT_FILE_MARKER) {
        return None;
    }
    let stem = file_name.replace(SENTIMENT_FILE_SUFFIX, "");
    let prefix = format!("{outlet}_");
    Some(stem.strip_prefix(&prefix).unwrap_or(&stem).to_string())
}

/// Sentiment files by outlet, then platform. Both levels iterate sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentimentCatalog {
    files: BTreeMap<String, BTreeMap<String, PathBuf>>,
}

impl SentimentCatalog {
    pub fn insert(&mut self, outlet: &str, platform: &str, path: PathBuf) {
        self.files
            .entry(outlet.to_string())
            .or_default()
            .insert(platform.to_string(), path);
    }

    #[must_use]
    pub fn path(&self, outlet: &str, platform: &str) -> Option<&Path> {
        self.files
            .get(outlet)
            .and_then(|p| p.get(platform))
            .map(PathBuf::as_path)
    }

    pub fn outlets(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn platforms<'a>(&'a self, outlet: &str) -> impl Iterator<Item = (&'a str, &'a Path)> {
        self.files
            .get(outlet)
            .into_iter()
            .flat_map(|p| p.iter().map(|(k, v)| (k.as_str(), v.as_path())))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Walks `<root>/<outlet>/` directories collecting sentiment CSVs.
///
/// A missing root gives an empty catalog.
///
/// # Errors
///
/// Returns [`AnalyticsError::Io`] if an existing directory cannot be listed.
pub fn scan_sentiment_catalog(root: &Path) -> Result<SentimentCatalog, AnalyticsError> {
    let mut catalog = SentimentCatalog::default();
    let Some(outlets) = sorted_entries(root)? else {
        tracing::warn!(root = %root.display(), "sentiment root does not exist");
        return Ok(catalog);
    };

    for outlet in outlets {
        let outlet_dir = root.join(&outlet);
        if !outlet_dir.is_dir() {
            continue;
        }
        for name in sorted_entries(&outlet_dir)?.unwrap_or_default() {
            if let Some(platform) = sentiment_platform(&outlet, &name) {
                catalog.insert(&outlet, &platform, outlet_dir.join(&name));
            }
        }
    }

    Ok(catalog)
}

/// File names in `dir`, sorted; `None` if `dir` does not exist.
fn sorted_entries(dir: &Path) -> Result<Option<Vec<String>>, AnalyticsError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AnalyticsError::io(dir, e)),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AnalyticsError::io(dir, e))?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(Some(names))
}
