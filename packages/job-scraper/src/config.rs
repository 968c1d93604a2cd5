use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

pub const DEFAULT_LISTING_URL: &str = "https://www.sarkariresult.com/latestjob/";
pub const DEFAULT_ARCHIVE_DIR: &str = "data/jobs_archive";

/// Roughly 7 days of history at 4 runs per day.
pub const DEFAULT_RETAIN_COUNT: usize = 28;

/// Scraper configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub listing_url: String,
    pub archive_dir: PathBuf,
    /// Start-to-start period between scheduled runs
    pub run_interval: Duration,
    /// Historical snapshots kept after pruning
    pub retain_count: usize,
    /// Enrichment tasks allowed in flight at once
    pub max_concurrency: usize,
    /// Upper bound on one candidate's enrichment
    pub task_timeout: Duration,
    pub listing_timeout: Duration,
    pub detail_timeout: Duration,
    /// Outbound request rate cap; `None` disables rate limiting
    pub requests_per_second: Option<u32>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            archive_dir: PathBuf::from(DEFAULT_ARCHIVE_DIR),
            run_interval: Duration::from_secs(6 * 60 * 60),
            retain_count: DEFAULT_RETAIN_COUNT,
            max_concurrency: 10,
            task_timeout: Duration::from_secs(15),
            listing_timeout: Duration::from_secs(15),
            detail_timeout: Duration::from_secs(10),
            requests_per_second: None,
        }
    }
}

impl ScraperConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();

        Self {
            listing_url: env::var("JOBS_LISTING_URL").unwrap_or(defaults.listing_url),
            archive_dir: env::var("JOBS_ARCHIVE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.archive_dir),
            run_interval: parse_var::<u64>("JOBS_RUN_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.run_interval),
            retain_count: parse_var("JOBS_RETAIN_COUNT")?.unwrap_or(defaults.retain_count),
            max_concurrency: parse_var("JOBS_MAX_CONCURRENCY")?
                .unwrap_or(defaults.max_concurrency),
            task_timeout: parse_var::<u64>("JOBS_TASK_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.task_timeout),
            listing_timeout: parse_var::<u64>("JOBS_LISTING_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.listing_timeout),
            detail_timeout: parse_var::<u64>("JOBS_DETAIL_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.detail_timeout),
            requests_per_second: parse_var("JOBS_REQUESTS_PER_SECOND")?,
        }
        .validated()
    }

    pub fn with_listing_url(mut self, url: impl Into<String>) -> Self {
        self.listing_url = url.into();
        self
    }

    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = dir.into();
        self
    }

    pub fn with_run_interval(mut self, interval: Duration) -> Self {
        self.run_interval = interval;
        self
    }

    pub fn with_retain_count(mut self, count: usize) -> Self {
        self.retain_count = count;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = Some(rps);
        self
    }

    fn validated(self) -> Result<Self> {
        anyhow::ensure!(
            self.max_concurrency > 0,
            "JOBS_MAX_CONCURRENCY must be greater than zero"
        );
        anyhow::ensure!(
            !self.run_interval.is_zero(),
            "JOBS_RUN_INTERVAL_SECS must be greater than zero"
        );
        anyhow::ensure!(
            self.requests_per_second != Some(0),
            "JOBS_REQUESTS_PER_SECOND must be greater than zero when set"
        );
        Ok(self)
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a valid number")),
        Err(_) => Ok(None),
    }
}
