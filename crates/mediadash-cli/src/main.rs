mod collect;
mod dashboard;
mod videos;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::collect::CollectCommands;
use crate::dashboard::DashboardCommands;
use crate::videos::VideosCommands;

#[derive(Debug, Parser)]
#[command(name = "mediadash-cli")]
#[command(about = "Collect channel videos and compare media outlet coverage")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect videos from an upstream platform
    Collect {
        #[command(subcommand)]
        command: CollectCommands,
    },
    /// Inspect stored videos
    Videos {
        #[command(subcommand)]
        command: VideosCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Topic and entity comparison over pre-computed CSVs
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = mediadash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Collect { command }) => collect::run(&config, command).await,
        Some(Commands::Videos { command }) => videos::run(&config, command).await,
        Some(Commands::Db { command }) => run_db(&config, command).await,
        Some(Commands::Dashboard { command }) => dashboard::run(&config, command),
        None => {
            println!("mediadash-cli: run with --help to list commands");
            Ok(())
        }
    }
}

/// Connect using the configured database URL and pool size.
pub(crate) async fn connect(config: &mediadash_core::AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool_config = mediadash_db::PoolConfig::from_app_config(config);
    let pool = mediadash_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

async fn run_db(config: &mediadash_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    match command {
        DbCommands::Migrate => {
            mediadash_db::run_migrations(&pool).await?;
            println!("migrations applied");
        }
        DbCommands::Ping => {
            mediadash_db::ping(&pool).await?;
            println!("database reachable");
        }
    }
    Ok(())
}
