//! YouTube metadata and transcript collector.
//!
//! Resolves a channel's uploads playlist, pages through it for videos
//! published inside a time window, looks up durations in batches, fetches
//! timed-text transcripts, and hands back fully enriched [`VideoRecord`]s for
//! the store. Upstream failures degrade to empty results or sentinels; they
//! never abort a run.
//!
//! [`VideoRecord`]: mediadash_core::VideoRecord

pub mod client;
pub mod collector;
pub mod duration;
pub mod error;
pub mod listing;
pub mod pagination;
pub mod transcript;
pub mod types;

pub use client::{YoutubeClient, DURATION_BATCH_SIZE};
pub use collector::{collect_channel, CollectRequest, CollectionOutcome};
pub use duration::{parse_iso8601_duration, VideoDuration};
pub use error::YoutubeError;
pub use listing::{list_videos_in_window, PublishWindow, ScanMode};
pub use pagination::{PageCursor, PlaylistPager};
pub use transcript::parse_timedtext;
pub use types::PlaylistVideo;
