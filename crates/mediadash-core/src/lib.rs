//! Shared configuration and domain records for mediadash.

pub mod app_config;
pub mod config;
pub mod videos;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use videos::{VideoRecord, TRANSCRIPT_UNAVAILABLE, UNKNOWN_DURATION};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
