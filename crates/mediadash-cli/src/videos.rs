use clap::Subcommand;
use mediadash_core::AppConfig;

/// Sub-commands available under `videos`.
#[derive(Debug, Subcommand)]
pub enum VideosCommands {
    /// List stored videos, newest first
    List {
        /// Maximum number of videos to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

pub(crate) async fn run(config: &AppConfig, command: VideosCommands) -> anyhow::Result<()> {
    match command {
        VideosCommands::List { limit } => run_videos_list(config, limit).await,
    }
}

/// Print stored videos as a table.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_videos_list(config: &AppConfig, limit: i64) -> anyhow::Result<()> {
    let pool = crate::connect(config).await?;
    mediadash_db::run_migrations(&pool).await?;
    let total = mediadash_db::count_videos(&pool).await?;
    let rows = mediadash_db::list_videos(&pool, limit.max(1)).await?;

    if rows.is_empty() {
        println!("no videos stored; run `collect youtube` first");
        return Ok(());
    }

    println!(
        "{:<14}{:<22}{:<11}{:<12}TITLE",
        "VIDEO", "PUBLISHED", "DURATION", "TRANSCRIPT"
    );
    for row in &rows {
        let has_transcript = row.transcript != mediadash_core::TRANSCRIPT_UNAVAILABLE;
        let title = if row.title.chars().count() > 50 {
            format!("{}...", row.title.chars().take(50).collect::<String>())
        } else {
            row.title.clone()
        };
        println!(
            "{:<14}{:<22}{:<11}{:<12}{}",
            row.video_id,
            row.published_at.format("%Y-%m-%d %H:%M:%S"),
            row.duration_hms,
            if has_transcript { "yes" } else { "no" },
            title
        );
    }
    println!("\nshowing {} of {total} videos", rows.len());
    Ok(())
}
