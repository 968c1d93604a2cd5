// Entry point for the job scraper

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use job_scraper::query::{self, JobCategory};
use job_scraper::{JobRecord, Pipeline, RunScheduler, ScraperConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "job-scraper")]
#[command(about = "Scrape job listings into a rotating JSON archive")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run immediately, then on the configured interval until Ctrl-C
    Run,

    /// Perform a single scrape run
    Once,

    /// Show the current snapshot, latest closing date first
    Latest {
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        per_page: usize,
        /// ssc, state or private
        #[arg(long)]
        category: Option<JobCategory>,
        /// Only jobs whose name mentions this state
        #[arg(long, conflicts_with = "category")]
        state: Option<String>,
    },

    /// Search the current snapshot by job name
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, default_value_t = 5)]
        per_page: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_scraper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = ScraperConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        listing_url = %config.listing_url,
        archive_dir = %config.archive_dir.display(),
        "Configuration loaded"
    );

    let interval = config.run_interval;
    let pipeline = Pipeline::from_config(config).context("Failed to build pipeline")?;

    match cli.command {
        Commands::Run => {
            let mut scheduler = RunScheduler::new(Arc::new(pipeline), interval);
            scheduler
                .start()
                .await
                .context("Failed to start scheduler")?;

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            tracing::info!("Shutdown requested");

            scheduler.shutdown().await.context("Scheduler shutdown failed")?;
        }
        Commands::Once => {
            let summary = pipeline.run_once().await.context("Scrape run failed")?;
            println!(
                "Saved {} jobs ({} with apply links), pruned {} old archives",
                summary.jobs, summary.with_apply_url, summary.pruned
            );
        }
        Commands::Latest {
            page,
            per_page,
            category,
            state,
        } => {
            let mut jobs = pipeline
                .archive()
                .load_current()
                .await
                .context("Failed to read current snapshot")?;
            if let Some(state) = state {
                jobs = query::filter_by_state(&jobs, &state);
            } else if let Some(category) = category {
                jobs = query::filter_by_category(&jobs, category);
            }
            query::sort_latest(&mut jobs);
            print_page(&query::paginate(&jobs, page, per_page));
        }
        Commands::Search {
            terms,
            page,
            per_page,
        } => {
            let jobs = pipeline
                .archive()
                .load_current()
                .await
                .context("Failed to read current snapshot")?;
            let matches = query::search(&jobs, &terms.join(" "));
            if matches.is_empty() {
                println!("No jobs found matching '{}'.", terms.join(" "));
                return Ok(());
            }
            print_page(&query::paginate(&matches, page, per_page));
        }
    }

    Ok(())
}

fn print_page(page: &query::Page<JobRecord>) {
    if page.items.is_empty() {
        println!("No jobs available right now.");
        return;
    }

    for job in &page.items {
        println!("{}", job.name);
        if job.last_date != job_scraper::NOT_SPECIFIED {
            println!("  Last date: {}", job.last_date);
        }
        println!("  Details:   {}", job.detail_link);
        if job.has_apply_url() {
            println!("  Apply:     {}", job.apply_url);
        }
        println!();
    }

    if page.has_more {
        println!("More jobs available: use --page {}", page.page + 1);
    }
}
