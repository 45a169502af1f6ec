//! `collect` command handlers.
//!
//! A run never aborts on upstream gaps: missing durations and transcripts
//! are stored as sentinels, and an unresolvable channel persists nothing.

use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use mediadash_core::{AppConfig, VideoRecord};
use mediadash_youtube::{
    collect_channel, CollectRequest, CollectionOutcome, PublishWindow, ScanMode, YoutubeClient,
};

const TRANSCRIPT_PREVIEW_CHARS: usize = 500;

/// Sub-commands available under `collect`.
#[derive(Debug, Subcommand)]
pub enum CollectCommands {
    /// Collect every video a YouTube channel published in a window
    Youtube {
        /// Channel ID (defaults to `YOUTUBE_CHANNEL_ID`)
        #[arg(long)]
        channel_id: Option<String>,
        /// Inclusive window start (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_window_bound)]
        start: DateTime<Utc>,
        /// Exclusive window end (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_window_bound)]
        end: DateTime<Utc>,
        /// Transcript language (defaults to `YOUTUBE_TRANSCRIPT_LANG`)
        #[arg(long)]
        lang: Option<String>,
        /// Walk every playlist page instead of stopping at the window start
        #[arg(long)]
        full_scan: bool,
        /// Collect and print without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
}

/// Accepts a calendar date (midnight UTC) or a full RFC 3339 timestamp.
pub(crate) fn parse_window_bound(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("expected YYYY-MM-DD or RFC 3339 timestamp, got {raw:?}"))
}

pub(crate) async fn run(config: &AppConfig, command: CollectCommands) -> anyhow::Result<()> {
    match command {
        CollectCommands::Youtube {
            channel_id,
            start,
            end,
            lang,
            full_scan,
            dry_run,
        } => {
            let channel_id = channel_id
                .or_else(|| config.channel_id.clone())
                .ok_or_else(|| {
                    anyhow::anyhow!("no channel given; pass --channel-id or set YOUTUBE_CHANNEL_ID")
                })?;
            let request = CollectRequest {
                channel_id,
                window: PublishWindow::new(start, end)?,
                scan_mode: if full_scan {
                    ScanMode::FullScan
                } else {
                    ScanMode::EarlyExit
                },
                transcript_lang: lang.unwrap_or_else(|| config.transcript_lang.clone()),
            };
            run_collect_youtube(config, &request, dry_run).await
        }
    }
}

/// Collect a channel's videos for the window and replace the `videos` table.
///
/// When `dry_run` is `true` the records are collected and printed but the
/// database is not touched.
///
/// # Errors
///
/// Returns an error if no API key is configured, the client cannot be built,
/// or persisting fails. Upstream failures during collection do not error.
pub(crate) async fn run_collect_youtube(
    config: &AppConfig,
    request: &CollectRequest,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = YoutubeClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build YouTube client: {e}"))?;

    tracing::info!(
        channel_id = %request.channel_id,
        start = %request.window.start(),
        end = %request.window.end(),
        scan_mode = ?request.scan_mode,
        "starting youtube collection"
    );
    let outcome = collect_channel(&client, request).await;

    if outcome.playlist_id.is_none() {
        println!(
            "channel {} could not be resolved; nothing collected",
            request.channel_id
        );
        return Ok(());
    }
    if outcome.records.is_empty() {
        println!("no videos published in the window; nothing written");
        return Ok(());
    }

    if dry_run {
        println!(
            "dry-run: collected {} videos; skipping database write",
            outcome.records.len()
        );
    } else {
        let pool = crate::connect(config).await?;
        mediadash_db::run_migrations(&pool).await?;
        let written = mediadash_db::replace_videos(&pool, &outcome.records).await?;
        tracing::info!(written, "videos table replaced");
    }

    print_summary(&outcome);
    for record in &outcome.records {
        print_record(record);
    }
    Ok(())
}

fn print_summary(outcome: &CollectionOutcome) {
    let total = outcome.records.len();
    println!("{:<25}{total}", "videos");
    println!("{:<25}{}/{total}", "with duration", outcome.durations_found);
    println!("{:<25}{}/{total}", "with transcript", outcome.transcripts_found);
    println!();
}

fn print_record(record: &VideoRecord) {
    println!("Title: {}", record.title);
    println!("URL: {}", record.url);
    println!("Published: {}  Duration: {}", record.published_at, record.duration_hms);
    println!("Transcript: {}", transcript_preview(&record.transcript));
    println!("{}", "-".repeat(60));
}

/// First [`TRANSCRIPT_PREVIEW_CHARS`] characters, with an ellipsis if cut.
pub(crate) fn transcript_preview(transcript: &str) -> String {
    let mut chars = transcript.chars();
    let preview: String = chars.by_ref().take(TRANSCRIPT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}
