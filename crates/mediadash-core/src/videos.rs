use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored in place of a transcript when the timed-text endpoint has nothing usable.
pub const TRANSCRIPT_UNAVAILABLE: &str = "Transcript not available";

/// Stored in place of a human-readable duration that could not be derived.
pub const UNKNOWN_DURATION: &str = "unknown";

/// One collected video, fully enriched. Written to the store as a whole set
/// at the end of a collection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    /// Raw ISO-8601 duration as returned upstream, if the lookup returned one.
    pub duration_iso: Option<String>,
    pub duration_seconds: Option<i64>,
    /// `H:MM:SS`, or [`UNKNOWN_DURATION`].
    pub duration_hms: String,
    pub url: String,
    /// Transcript text, or [`TRANSCRIPT_UNAVAILABLE`].
    pub transcript: String,
}

impl VideoRecord {
    /// Canonical watch URL for a video id.
    #[must_use]
    pub fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={video_id}")
    }

    #[must_use]
    pub fn has_transcript(&self) -> bool {
        self.transcript != TRANSCRIPT_UNAVAILABLE
    }
}
