//! Periodic scrape runs using tokio-cron-scheduler.
//!
//! # Behaviour
//!
//! - One run fires immediately on [`RunScheduler::start`], then every
//!   `interval`, measured start to start.
//! - A failing run is logged and has no effect on later runs.
//! - Runs never overlap: a scheduled tick that finds a run in flight is
//!   skipped. Manual triggers wait for the in-flight run instead.
//!
//! ```text
//! start() ──► repeated job (every interval) ──┐
//!        └─► immediate run ───────────────────┤
//! trigger() (manual) ─────────────────────────┴─► gate ──► ScrapeRun::run
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::error::ScrapeResult;
use crate::pipeline::{Pipeline, RunSummary};

/// Something the scheduler can execute once per tick.
#[async_trait]
pub trait ScrapeRun: Send + Sync {
    async fn run(&self) -> ScrapeResult<RunSummary>;
}

#[async_trait]
impl ScrapeRun for Pipeline {
    async fn run(&self) -> ScrapeResult<RunSummary> {
        self.run_once().await
    }
}

/// Result of one scheduled tick.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunSummary),
    Failed,
    /// Another run held the gate
    Skipped,
}

pub struct RunScheduler {
    runner: Arc<dyn ScrapeRun>,
    interval: Duration,
    gate: Arc<Mutex<()>>,
    scheduler: Option<JobScheduler>,
}

impl RunScheduler {
    pub fn new(runner: Arc<dyn ScrapeRun>, interval: Duration) -> Self {
        Self {
            runner,
            interval,
            gate: Arc::new(Mutex::new(())),
            scheduler: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start periodic runs and fire the first one immediately.
    pub async fn start(&mut self) -> ScrapeResult<()> {
        let scheduler = JobScheduler::new().await?;

        let runner = Arc::clone(&self.runner);
        let gate = Arc::clone(&self.gate);
        let scrape_job = Job::new_repeated_async(self.interval, move |_uuid, _lock| {
            let runner = Arc::clone(&runner);
            let gate = Arc::clone(&gate);
            Box::pin(async move {
                run_guarded(runner, gate).await;
            })
        })?;

        scheduler.add(scrape_job).await?;
        scheduler.start().await?;
        self.scheduler = Some(scheduler);

        info!(
            interval_secs = self.interval.as_secs(),
            "Scrape scheduler started"
        );

        tokio::spawn(run_guarded(Arc::clone(&self.runner), Arc::clone(&self.gate)));
        Ok(())
    }

    /// Run now, waiting for any in-flight run to finish first.
    pub async fn trigger(&self) -> ScrapeResult<RunSummary> {
        let _guard = self.gate.lock().await;
        info!("Manual scrape run triggered");
        self.runner.run().await
    }

    pub async fn shutdown(&mut self) -> ScrapeResult<()> {
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.shutdown().await?;
            info!("Scrape scheduler stopped");
        }
        Ok(())
    }
}

/// Run once unless another run holds the gate. Errors stop here.
pub async fn run_guarded(runner: Arc<dyn ScrapeRun>, gate: Arc<Mutex<()>>) -> RunOutcome {
    let Ok(_guard) = gate.try_lock() else {
        warn!("Previous scrape run still in progress; skipping this tick");
        return RunOutcome::Skipped;
    };

    match runner.run().await {
        Ok(summary) => RunOutcome::Completed(summary),
        Err(e) => {
            error!(error = %e, "Scrape run failed");
            RunOutcome::Failed
        }
    }
}
