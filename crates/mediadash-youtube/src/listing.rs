//! Enumerate the uploads playlist for videos published inside a window.

use chrono::{DateTime, Utc};

use crate::client::YoutubeClient;
use crate::error::YoutubeError;
use crate::pagination::PlaylistPager;
use crate::types::PlaylistVideo;

/// Half-open UTC publish window: `start <= published_at < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl PublishWindow {
    /// # Errors
    ///
    /// Returns [`YoutubeError::InvalidWindow`] unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, YoutubeError> {
        if start >= end {
            return Err(YoutubeError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn contains(&self, published_at: DateTime<Utc>) -> bool {
        self.start <= published_at && published_at < self.end
    }
}

/// How the playlist is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Stop at the first item older than the window start. Correct only when
    /// the feed is sorted newest first, which the uploads playlist is.
    #[default]
    EarlyExit,
    /// Read every page and filter. Use for feeds without an ordering guarantee.
    FullScan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageVerdict {
    Continue,
    Stop,
}

/// Moves in-window videos from one page into `out` and decides whether the
/// next page is needed.
pub(crate) fn absorb_page(
    page: Vec<PlaylistVideo>,
    window: &PublishWindow,
    mode: ScanMode,
    out: &mut Vec<PlaylistVideo>,
) -> PageVerdict {
    for video in page {
        let published_at = video.published_at;
        if window.contains(published_at) {
            out.push(video);
        }
        if mode == ScanMode::EarlyExit && published_at < window.start {
            return PageVerdict::Stop;
        }
    }
    PageVerdict::Continue
}

/// Pages through `playlist_id` and returns the videos published inside
/// `window`, in playlist order.
pub async fn list_videos_in_window(
    client: &YoutubeClient,
    playlist_id: &str,
    window: &PublishWindow,
    mode: ScanMode,
) -> Vec<PlaylistVideo> {
    let mut pager = PlaylistPager::new(client, playlist_id);
    let mut videos = Vec::new();

    while let Some(page) = pager.next_page().await {
        if absorb_page(page, window, mode, &mut videos) == PageVerdict::Stop {
            tracing::debug!(
                pages = pager.pages_fetched(),
                "reached videos older than window start; stopping"
            );
            break;
        }
    }

    tracing::info!(
        playlist_id,
        pages = pager.pages_fetched(),
        videos = videos.len(),
        ?mode,
        "playlist listing complete"
    );
    videos
}
