//! HTTP client for the YouTube Data API v3 and the timed-text endpoint.
//!
//! Wraps `reqwest` with API key management and typed response
//! deserialization. Calls are issued one at a time and never retried.

use std::collections::HashMap;
use std::time::Duration;

use mediadash_core::{AppConfig, TRANSCRIPT_UNAVAILABLE};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::YoutubeError;
use crate::transcript::parse_timedtext;
use crate::types::{ChannelListResponse, PlaylistItemsResponse, VideoListResponse};

const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
const DEFAULT_TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";

/// Upstream cap on ids per `videos` request and items per playlist page.
pub const DURATION_BATCH_SIZE: usize = 50;

/// Client for the YouTube Data API.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_urls`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    api_base_url: Url,
    timedtext_url: Url,
}

impl YoutubeClient {
    /// Creates a client pointed at the production endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, YoutubeError> {
        Self::with_base_urls(
            api_key,
            timeout_secs,
            user_agent,
            DEFAULT_API_BASE_URL,
            DEFAULT_TIMEDTEXT_URL,
        )
    }

    /// Creates a client from application config.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Config`] when no key is configured, plus
    /// the errors of [`YoutubeClient::with_base_urls`].
    pub fn from_config(config: &AppConfig) -> Result<Self, YoutubeError> {
        let api_key = config.require_youtube_api_key()?;
        Self::with_base_urls(
            api_key,
            config.http_timeout_secs,
            &config.user_agent,
            &config.youtube_api_base_url,
            &config.timedtext_base_url,
        )
    }

    /// Creates a client with custom endpoints (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`YoutubeError::InvalidBaseUrl`] if either URL does not parse.
    pub fn with_base_urls(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        api_base_url: &str,
        timedtext_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends the endpoint name
        // instead of replacing the last path segment.
        let normalised = format!("{}/", api_base_url.trim_end_matches('/'));
        let api_base_url = Url::parse(&normalised).map_err(|e| YoutubeError::InvalidBaseUrl {
            url: api_base_url.to_owned(),
            reason: e.to_string(),
        })?;
        let timedtext_url = Url::parse(timedtext_url).map_err(|e| YoutubeError::InvalidBaseUrl {
            url: timedtext_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            api_base_url,
            timedtext_url,
        })
    }

    /// Resolves a channel id to its uploads playlist id.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::ChannelNotFound`] if the response has no uploads playlist.
    /// - [`YoutubeError::Http`] on network failure or non-2xx status.
    /// - [`YoutubeError::Deserialize`] if the body has an unexpected shape.
    pub async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String, YoutubeError> {
        let url = self.build_url(
            "channels",
            &[("part", "contentDetails"), ("id", channel_id)],
        )?;
        let body: ChannelListResponse = self
            .request_json(&url, &format!("channels(id={channel_id})"))
            .await?;

        body.uploads_playlist_id()
            .map(str::to_owned)
            .ok_or_else(|| YoutubeError::ChannelNotFound(channel_id.to_owned()))
    }

    /// Fetches one page of playlist items, starting at `page_token` when given.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::Http`] on network failure or non-2xx status.
    /// - [`YoutubeError::Deserialize`] if the body has an unexpected shape.
    pub async fn playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsResponse, YoutubeError> {
        let max_results = DURATION_BATCH_SIZE.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let url = self.build_url("playlistItems", &params)?;
        self.request_json(&url, &format!("playlistItems(playlistId={playlist_id})"))
            .await
    }

    /// Looks up raw ISO-8601 durations for at most [`DURATION_BATCH_SIZE`] ids.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::Http`] on network failure or non-2xx status.
    /// - [`YoutubeError::Deserialize`] if the body has an unexpected shape.
    pub async fn video_durations_batch(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<(String, String)>, YoutubeError> {
        let ids = video_ids.join(",");
        let url = self.build_url("videos", &[("part", "contentDetails"), ("id", &ids)])?;
        let body: VideoListResponse = self
            .request_json(&url, &format!("videos(count={})", video_ids.len()))
            .await?;

        Ok(body
            .items
            .into_iter()
            .filter_map(|item| {
                let duration = item.content_details?.duration?;
                Some((item.id, duration))
            })
            .collect())
    }

    /// Looks up durations for any number of ids, one request per batch of
    /// [`DURATION_BATCH_SIZE`].
    ///
    /// A failed batch contributes no entries; the map holds exactly the ids
    /// the upstream responses contained.
    pub async fn video_durations(&self, video_ids: &[String]) -> HashMap<String, String> {
        let mut durations = HashMap::with_capacity(video_ids.len());

        for (batch_index, batch) in video_ids.chunks(DURATION_BATCH_SIZE).enumerate() {
            match self.video_durations_batch(batch).await {
                Ok(entries) => durations.extend(entries),
                Err(e) => {
                    tracing::warn!(
                        batch = batch_index,
                        batch_len = batch.len(),
                        error = %e,
                        "duration lookup failed; batch left without durations"
                    );
                }
            }
        }

        durations
    }

    /// Fetches and flattens the timed-text transcript for one video.
    ///
    /// Returns [`TRANSCRIPT_UNAVAILABLE`] for any failure: network error,
    /// non-2xx status, blank body, malformed XML or no text elements.
    pub async fn fetch_transcript(&self, video_id: &str, lang: &str) -> String {
        let mut url = self.timedtext_url.clone();
        url.query_pairs_mut()
            .append_pair("lang", lang)
            .append_pair("v", video_id);

        let body = match self.fetch_text(url).await {
            Ok(Some(body)) => body,
            Ok(None) => return TRANSCRIPT_UNAVAILABLE.to_owned(),
            Err(e) => {
                tracing::debug!(video_id, error = %e, "transcript request failed");
                return TRANSCRIPT_UNAVAILABLE.to_owned();
            }
        };

        match parse_timedtext(&body) {
            Ok(Some(text)) => text,
            Ok(None) => TRANSCRIPT_UNAVAILABLE.to_owned(),
            Err(e) => {
                tracing::warn!(video_id, error = %e, "malformed timed-text document");
                TRANSCRIPT_UNAVAILABLE.to_owned()
            }
        }
    }

    /// GETs a URL and returns its body, or `None` for a non-2xx status or a
    /// blank body.
    async fn fetch_text(&self, url: Url) -> Result<Option<String>, YoutubeError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(body))
    }

    /// Builds an API URL for `endpoint`, appending `key` and the given
    /// parameters with proper percent-encoding.
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, YoutubeError> {
        let mut url =
            self.api_base_url
                .join(endpoint)
                .map_err(|e| YoutubeError::InvalidBaseUrl {
                    url: self.api_base_url.to_string(),
                    reason: e.to_string(),
                })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx status, and parses the body as `T`.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, YoutubeError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
