use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://mediadash.db?mode=rwc";
pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
pub const DEFAULT_TIMEDTEXT_BASE_URL: &str = "https://video.google.com/timedtext";
pub const DEFAULT_USER_AGENT: &str = "mediadash/0.1 (media-analytics)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `.env` templates can leave them empty.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = or_default("DATABASE_URL", DEFAULT_DATABASE_URL);
    let env = parse_environment(&or_default("MEDIADASH_ENV", "development"))?;
    let bind_addr = parse_addr("MEDIADASH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("MEDIADASH_LOG_LEVEL", "info");

    let data_root = PathBuf::from(or_default("MEDIADASH_DATA_ROOT", "./data"));
    let sentiment_root = PathBuf::from(or_default(
        "MEDIADASH_SENTIMENT_ROOT",
        "./data/output_entities_sentiment_structured",
    ));

    let extra_stopwords: Vec<String> = optional("MEDIADASH_EXTRA_STOPWORDS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let youtube_api_key = optional("YOUTUBE_API_KEY");
    let channel_id = optional("YOUTUBE_CHANNEL_ID");
    let youtube_api_base_url = or_default("YOUTUBE_API_BASE_URL", DEFAULT_YOUTUBE_API_BASE_URL);
    let timedtext_base_url = or_default("YOUTUBE_TIMEDTEXT_BASE_URL", DEFAULT_TIMEDTEXT_BASE_URL);
    let transcript_lang = or_default("YOUTUBE_TRANSCRIPT_LANG", "en");

    let http_timeout_secs = parse_u64("MEDIADASH_HTTP_TIMEOUT_SECS", "30")?;
    if http_timeout_secs == 0 {
        return Err(invalid(
            "MEDIADASH_HTTP_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default("MEDIADASH_USER_AGENT", DEFAULT_USER_AGENT);
    let db_max_connections = parse_u32("MEDIADASH_DB_MAX_CONNECTIONS", "5")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        data_root,
        sentiment_root,
        extra_stopwords,
        youtube_api_key,
        channel_id,
        youtube_api_base_url,
        timedtext_base_url,
        transcript_lang,
        http_timeout_secs,
        user_agent,
        db_max_connections,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MEDIADASH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
