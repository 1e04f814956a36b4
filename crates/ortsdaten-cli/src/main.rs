use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ortsdaten_core::catalog;
use ortsdaten_scraper::{OutputBundle, RunOutcome, ScrapeOrchestrator, UsageStats};

/// Details calls assumed per search when estimating commercial spend
/// up front; matches the nearby-search result cap.
const ESTIMATED_DETAILS_PER_SEARCH: u64 = 20;

#[derive(Debug, Parser)]
#[command(name = "ortsdaten")]
#[command(about = "Place data collection for German cities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show what a run would do (cities, jobs, estimated cost) without
    /// touching any upstream.
    Plan,
    /// Run the scrape and write the JSON artifacts.
    Scrape {
        /// Restrict the run to these cities instead of the full catalog.
        #[arg(long, value_delimiter = ',')]
        cities: Vec<String>,
        /// Write artifacts here instead of the configured output directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ortsdaten_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Plan => plan(&config),
        Commands::Scrape { cities, output } => scrape(&config, cities, output).await?,
    }

    Ok(())
}

fn plan(config: &ortsdaten_core::AppConfig) {
    let cities = catalog::city_count();
    let jobs = cities * config.categories.len();

    println!("mode:       {}", source_label(config.use_google_places));
    println!("cities:     {cities}");
    println!("categories: {}", config.categories.len());
    println!("jobs:       {jobs}");

    if config.use_google_places {
        let projected = UsageStats {
            searches_performed: jobs as u64,
            details_fetched: jobs as u64 * ESTIMATED_DETAILS_PER_SEARCH,
        };
        let cost = projected.estimated_cost_usd();
        println!("estimated cost: ${cost:.2}");
        if projected.free_tier_remaining_usd() <= 0.0 {
            println!("warning: estimated cost exceeds the monthly free tier");
        }
    }
}

async fn scrape(
    config: &ortsdaten_core::AppConfig,
    cities: Vec<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut orchestrator = ScrapeOrchestrator::from_config(config)?;
    if !cities.is_empty() {
        orchestrator = orchestrator.with_cities(cities);
    }
    tracing::info!(
        source = source_label(config.use_google_places),
        jobs = orchestrator.planned_jobs(),
        "starting collection"
    );

    let cancel = orchestrator.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing in-flight jobs");
            cancel.cancel();
        }
    });

    let report = orchestrator.run().await;
    if report.outcome == RunOutcome::Cancelled {
        tracing::warn!(
            records = report.records.len(),
            "run cancelled, writing partial results"
        );
    }
    if config.use_google_places {
        tracing::info!(
            searches = report.usage.searches_performed,
            details = report.usage.details_fetched,
            estimated_cost_usd = report.usage.estimated_cost_usd(),
            "final API usage"
        );
    }

    let out_dir = output.unwrap_or_else(|| config.output_dir.clone());
    let bundle = OutputBundle::build(report.records);
    bundle.write(&out_dir)?;
    tracing::info!(
        places = bundle.metadata.total_places,
        cities = report.cities_processed,
        elapsed_secs = report.elapsed.as_secs(),
        output = %out_dir.display(),
        "collection finished"
    );

    Ok(())
}

fn source_label(commercial: bool) -> &'static str {
    if commercial {
        "google_places"
    } else {
        "openstreetmap"
    }
}
