//! Wire types for the YouTube Data API v3 endpoints the collector calls.
//!
//! Every field the collector does not strictly need is optional so a partial
//! item degrades to "skipped" instead of failing the whole page.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `GET channels?part=contentDetails&id=...`
#[derive(Debug, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

impl ChannelListResponse {
    /// The uploads playlist id of the first returned channel, if any.
    #[must_use]
    pub fn uploads_playlist_id(&self) -> Option<&str> {
        self.items
            .first()?
            .content_details
            .as_ref()?
            .related_playlists
            .as_ref()?
            .uploads
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}

/// `GET playlistItems?part=snippet&playlistId=...`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub snippet: Option<PlaylistItemSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub published_at: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: Option<String>,
}

/// `GET videos?part=contentDetails&id=a,b,c`
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
pub struct VideoContentDetails {
    pub duration: Option<String>,
}

/// A playlist entry reduced to the fields the collector keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistVideo {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
}

impl PlaylistVideo {
    /// Returns `None` when the item has no video id or no parseable publish time.
    #[must_use]
    pub fn from_item(item: PlaylistItem) -> Option<Self> {
        let snippet = item.snippet?;
        let video_id = snippet.resource_id?.video_id?;
        let published_at = DateTime::parse_from_rfc3339(snippet.published_at.as_deref()?)
            .ok()?
            .with_timezone(&Utc);

        Some(Self {
            video_id,
            title: snippet.title.unwrap_or_default(),
            description: snippet.description.unwrap_or_default(),
            published_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploads_playlist_id_reads_first_channel() {
        let body = serde_json::json!({
            "items": [{
                "contentDetails": { "relatedPlaylists": { "uploads": "UUqnbDFdCpuN8CMEg0VuEBqA" } }
            }]
        });
        let parsed: ChannelListResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.uploads_playlist_id(), Some("UUqnbDFdCpuN8CMEg0VuEBqA"));
    }

    #[test]
    fn uploads_playlist_id_is_none_without_items() {
        let parsed: ChannelListResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.uploads_playlist_id().is_none());
    }

    #[test]
    fn playlist_video_requires_id_and_publish_time() {
        let item: PlaylistItem = serde_json::from_value(serde_json::json!({
            "snippet": {
                "publishedAt": "2025-05-03T12:00:00Z",
                "title": "Headline",
                "resourceId": { "videoId": "vid1" }
            }
        }))
        .unwrap();
        let video = PlaylistVideo::from_item(item).expect("complete item");
        assert_eq!(video.video_id, "vid1");
        assert_eq!(video.description, "");

        let missing_id: PlaylistItem = serde_json::from_value(serde_json::json!({
            "snippet": { "publishedAt": "2025-05-03T12:00:00Z", "title": "No id" }
        }))
        .unwrap();
        assert!(PlaylistVideo::from_item(missing_id).is_none());

        let bad_time: PlaylistItem = serde_json::from_value(serde_json::json!({
            "snippet": { "publishedAt": "yesterday", "resourceId": { "videoId": "vid2" } }
        }))
        .unwrap();
        assert!(PlaylistVideo::from_item(bad_time).is_none());
    }
}
