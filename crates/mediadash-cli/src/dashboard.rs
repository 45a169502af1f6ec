//! `dashboard` command handlers: the comparison view as plain-text tables.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use mediadash_analytics::{
    Dashboard, DashboardRequest, DashboardView, Selection, DEFAULT_THRESHOLD,
};
use mediadash_core::AppConfig;

/// Sub-commands available under `dashboard`.
#[derive(Debug, Subcommand)]
pub enum DashboardCommands {
    /// List outlets and the platforms with sentiment data
    Outlets,
    /// Compare topic distributions and entity shares of two selections
    Compare(CompareArgs),
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[arg(long)]
    pub outlet1: String,
    #[arg(long)]
    pub platform1: String,
    #[arg(long)]
    pub outlet2: String,
    #[arg(long)]
    pub platform2: String,
    /// First selection start date (YYYY-MM-DD)
    #[arg(long)]
    pub start1: Option<NaiveDate>,
    #[arg(long)]
    pub end1: Option<NaiveDate>,
    #[arg(long)]
    pub start2: Option<NaiveDate>,
    #[arg(long)]
    pub end2: Option<NaiveDate>,
    /// Minimum percentage for a topic slice to be shown (0-20)
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,
    /// Extra entity to exclude from the comparison (repeatable)
    #[arg(long = "stopword", value_name = "ENTITY")]
    pub stopwords: Vec<String>,
    /// Print the full view as JSON, chart specs included
    #[arg(long)]
    pub json: bool,
}

impl CompareArgs {
    fn to_request(&self) -> DashboardRequest {
        let mut request = DashboardRequest::new(
            Selection::new(&self.outlet1, &self.platform1).between(self.start1, self.end1),
            Selection::new(&self.outlet2, &self.platform2).between(self.start2, self.end2),
        );
        request.threshold = self.threshold;
        request
    }
}

pub(crate) fn run(config: &AppConfig, command: DashboardCommands) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::from_config(config);
    match command {
        DashboardCommands::Outlets => run_dashboard_outlets(&mut dashboard),
        DashboardCommands::Compare(args) => {
            let mut dashboard = dashboard.with_extra_stopwords(&args.stopwords);
            run_dashboard_compare(&mut dashboard, &args)
        }
    }
}

/// # Errors
///
/// Returns an error if the sentiment root cannot be listed.
pub(crate) fn run_dashboard_outlets(dashboard: &mut Dashboard) -> anyhow::Result<()> {
    let outlets = dashboard.outlets()?;
    if outlets.is_empty() {
        println!(
            "no sentiment files found under {}",
            dashboard.sentiment_root().display()
        );
        return Ok(());
    }

    println!("{:<25}{:<15}{:<12}{:<12}ENTITY", "OUTLET", "PLATFORM", "FIRST", "LAST");
    for outlet in &outlets {
        for platform in &outlet.platforms {
            println!(
                "{:<25}{:<15}{:<12}{:<12}{}",
                outlet.outlet,
                platform.platform,
                platform.first.date(),
                platform.last.date(),
                if platform.has_entity_column { "yes" } else { "no" }
            );
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the request is invalid or JSON output fails.
pub(crate) fn run_dashboard_compare(
    dashboard: &mut Dashboard,
    args: &CompareArgs,
) -> anyhow::Result<()> {
    let view = dashboard.render(&args.to_request())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn print_view(view: &DashboardView) {
    for warning in &view.warnings {
        eprintln!("warning: {warning}");
    }

    println!("Topical Distribution by Section (threshold {}%)", view.threshold);
    for panel in &view.topics {
        println!();
        println!("{} - {}", panel.outlet, panel.platform);
        if let Some(range) = &panel.available {
            println!("available: {} to {}", range.start(), range.end());
        }
        if let Some(message) = &panel.message {
            println!("  {message}");
            continue;
        }
        for share in &panel.shares {
            println!("  {:<25}{:>6.1}%", share.section, share.percent);
        }
    }

    println!();
    println!("Entity % Share Comparison for Top Entities");
    let Some(comparison) = &view.entities.comparison else {
        if let Some(message) = &view.entities.message {
            println!("  {message}");
        }
        return;
    };

    print!("  {:<25}", "ENTITY");
    for source in &comparison.sources {
        print!("{:>22}", source.as_str());
    }
    println!();
    for entity in &comparison.entity_axis {
        print!("  {entity:<25}");
        for source in &comparison.sources {
            let percent = comparison
                .shares
                .iter()
                .find(|s| &s.source == source && &s.entity == entity)
                .map_or(0.0, |s| s.percent);
            print!("{percent:>21.1}%");
        }
        println!();
    }
}
