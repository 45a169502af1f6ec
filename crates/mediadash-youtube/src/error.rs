use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned by the YouTube collector.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure, or a non-2xx status from the upstream API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The channel lookup returned no uploads playlist.
    #[error("channel {0} not found or has no uploads playlist")]
    ChannelNotFound(String),

    #[error(transparent)]
    Config(#[from] mediadash_core::ConfigError),

    #[error("invalid publish window: start {start} is not before end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
