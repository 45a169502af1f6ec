//! Page-token pagination over a playlist.
//!
//! The API returns a `nextPageToken` with every page except the last. The
//! token is carried in an explicit [`PageCursor`] so a pager can be paused,
//! inspected and resumed from any page boundary.

use crate::client::YoutubeClient;
use crate::types::PlaylistVideo;

/// Upper bound on pages fetched by one pager. Guards against a feed that
/// keeps handing back fresh tokens forever.
pub const MAX_PAGES: usize = 2_000;

/// Where the next playlist page request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// No page fetched yet.
    Start,
    /// Continue from this upstream page token.
    Next(String),
    /// No further pages.
    Exhausted,
}

impl PageCursor {
    fn from_token(token: Option<String>) -> Self {
        match token {
            Some(t) if !t.is_empty() => PageCursor::Next(t),
            _ => PageCursor::Exhausted,
        }
    }

    fn token(&self) -> Option<&str> {
        match self {
            PageCursor::Next(t) => Some(t),
            PageCursor::Start | PageCursor::Exhausted => None,
        }
    }
}

/// Lazy sequence of playlist pages driven by [`PlaylistPager::next_page`].
pub struct PlaylistPager<'a> {
    client: &'a YoutubeClient,
    playlist_id: String,
    cursor: PageCursor,
    pages_fetched: usize,
}

impl<'a> PlaylistPager<'a> {
    #[must_use]
    pub fn new(client: &'a YoutubeClient, playlist_id: &str) -> Self {
        Self::resume(client, playlist_id, PageCursor::Start)
    }

    /// Picks up paging from a cursor previously read with [`PlaylistPager::cursor`].
    #[must_use]
    pub fn resume(client: &'a YoutubeClient, playlist_id: &str, cursor: PageCursor) -> Self {
        Self {
            client,
            playlist_id: playlist_id.to_owned(),
            cursor,
            pages_fetched: 0,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    #[must_use]
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetches the page at the current cursor and advances past it.
    ///
    /// Returns `None` once the cursor is exhausted. A failed or malformed
    /// page yields `Some(vec![])` and exhausts the cursor, since its
    /// continuation token is unknown. Items missing an id or a parseable
    /// publish time are dropped.
    pub async fn next_page(&mut self) -> Option<Vec<PlaylistVideo>> {
        if self.cursor == PageCursor::Exhausted {
            return None;
        }
        if self.pages_fetched >= MAX_PAGES {
            tracing::warn!(
                playlist_id = %self.playlist_id,
                max_pages = MAX_PAGES,
                "playlist page limit reached; stopping"
            );
            self.cursor = PageCursor::Exhausted;
            return None;
        }

        let result = self
            .client
            .playlist_items_page(&self.playlist_id, self.cursor.token())
            .await;
        self.pages_fetched += 1;

        match result {
            Ok(page) => {
                let next = PageCursor::from_token(page.next_page_token);
                // A token that points back at the page just read would loop forever.
                self.cursor = if next == self.cursor {
                    PageCursor::Exhausted
                } else {
                    next
                };

                let raw_count = page.items.len();
                let videos: Vec<PlaylistVideo> = page
                    .items
                    .into_iter()
                    .filter_map(PlaylistVideo::from_item)
                    .collect();
                if videos.len() < raw_count {
                    tracing::debug!(
                        dropped = raw_count - videos.len(),
                        "skipped playlist items without id or publish time"
                    );
                }
                Some(videos)
            }
            Err(e) => {
                tracing::warn!(
                    playlist_id = %self.playlist_id,
                    page = self.pages_fetched,
                    error = %e,
                    "playlist page unavailable; treating as empty and stopping"
                );
                self.cursor = PageCursor::Exhausted;
                Some(Vec::new())
            }
        }
    }
}
