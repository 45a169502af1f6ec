use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings, built once at startup and handed to each pipeline
/// stage explicitly.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Root folder holding the per-platform topic CSV folders.
    pub data_root: PathBuf,
    /// Root folder holding one sub-folder of sentiment CSVs per outlet.
    pub sentiment_root: PathBuf,
    /// Entities excluded from comparisons on top of the built-in list.
    pub extra_stopwords: Vec<String>,
    pub youtube_api_key: Option<String>,
    pub channel_id: Option<String>,
    pub youtube_api_base_url: String,
    pub timedtext_base_url: String,
    pub transcript_lang: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub db_max_connections: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &self.database_url)
            .field("data_root", &self.data_root)
            .field("sentiment_root", &self.sentiment_root)
            .field("extra_stopwords", &self.extra_stopwords)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("channel_id", &self.channel_id)
            .field("youtube_api_base_url", &self.youtube_api_base_url)
            .field("timedtext_base_url", &self.timedtext_base_url)
            .field("transcript_lang", &self.transcript_lang)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

impl AppConfig {
    /// The API key, required only by the collector.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `YOUTUBE_API_KEY` was unset
    /// or blank at load.
    pub fn require_youtube_api_key(&self) -> Result<&str, ConfigError> {
        self.youtube_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("YOUTUBE_API_KEY".to_string()))
    }
}
