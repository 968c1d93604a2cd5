//! Per-job enrichment: fetch each candidate's detail page and classify its
//! apply link.
//!
//! # Guarantees
//!
//! - At most `max_concurrency` candidates are being enriched at once.
//! - Each candidate gets `task_timeout` from the moment it holds a permit.
//! - Every candidate yields exactly one [`JobRecord`], in input order. A
//!   timeout, fetch failure, or panicking task degrades to `apply_url = ""`.
//! - `enrich` returns only after every spawned task has finished.
//!
//! ```text
//! candidates ──► spawn (one task each) ──► Semaphore(max_concurrency)
//!                                              └─► timeout(fetch → anchors → classify)
//! handles awaited in input order ──► Vec<JobRecord>
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use crate::classifier::classify;
use crate::config::ScraperConfig;
use crate::error::{FetchError, ScrapeError};
use crate::extractor::anchors_in;
use crate::fetcher::PageFetcher;
use crate::types::{Candidate, JobRecord};

/// Limits applied to one enrichment pass.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub max_concurrency: usize,
    pub task_timeout: Duration,
    /// Timeout handed to the fetcher for each detail page
    pub fetch_timeout: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            task_timeout: Duration::from_secs(15),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&ScraperConfig> for EnrichmentConfig {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            task_timeout: config.task_timeout,
            fetch_timeout: config.detail_timeout,
        }
    }
}

#[derive(Debug, Error)]
enum EnrichFailure {
    #[error("enrichment timed out after {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ScrapeError),

    #[error("concurrency limiter closed")]
    LimiterClosed,
}

/// Fans detail-page lookups out over a bounded pool of tasks.
pub struct Enricher {
    fetcher: Arc<dyn PageFetcher>,
    base_url: Option<Url>,
    config: EnrichmentConfig,
}

impl Enricher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: EnrichmentConfig) -> Self {
        Self {
            fetcher,
            base_url: None,
            config,
        }
    }

    /// Resolve site-relative detail links against `base` before fetching.
    pub fn with_base_url(mut self, base: Url) -> Self {
        self.base_url = Some(base);
        self
    }

    /// Enrich every candidate, preserving input order.
    pub async fn enrich(&self, candidates: Vec<Candidate>) -> Vec<JobRecord> {
        if candidates.is_empty() {
            return Vec::new();
        }

        info!(
            candidates = candidates.len(),
            concurrency = self.config.max_concurrency,
            "Starting enrichment"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));

        let handles: Vec<_> = candidates
            .iter()
            .map(|candidate| {
                let target = self.resolve(&candidate.detail_url);
                let fetcher = Arc::clone(&self.fetcher);
                let semaphore = Arc::clone(&semaphore);
                let config = self.config.clone();

                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| EnrichFailure::LimiterClosed)?;

                    tokio::time::timeout(
                        config.task_timeout,
                        find_apply_url(fetcher.as_ref(), &target, config.fetch_timeout),
                    )
                    .await
                    .unwrap_or(Err(EnrichFailure::TimedOut(config.task_timeout)))
                })
            })
            .collect();

        let mut records = Vec::with_capacity(candidates.len());
        for (candidate, handle) in candidates.into_iter().zip(handles) {
            let apply_url = match handle.await {
                Ok(Ok(apply_url)) => {
                    debug!(url = %candidate.detail_url, apply_url = %apply_url, "Enriched job");
                    apply_url
                }
                Ok(Err(e)) => {
                    warn!(
                        url = %candidate.detail_url,
                        error = %e,
                        "Enrichment failed; keeping job without apply URL"
                    );
                    String::new()
                }
                Err(e) => {
                    warn!(
                        url = %candidate.detail_url,
                        error = %e,
                        "Enrichment task aborted; keeping job without apply URL"
                    );
                    String::new()
                }
            };
            records.push(JobRecord::from_candidate(candidate, apply_url));
        }

        info!(
            jobs = records.len(),
            with_apply_url = records.iter().filter(|r| r.has_apply_url()).count(),
            "Enrichment completed"
        );

        records
    }

    fn resolve(&self, href: &str) -> String {
        match &self.base_url {
            Some(base) => base
                .join(href)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        }
    }
}

async fn find_apply_url(
    fetcher: &dyn PageFetcher,
    url: &str,
    fetch_timeout: Duration,
) -> Result<String, EnrichFailure> {
    let html = fetcher.fetch(url, fetch_timeout).await?;
    let anchors = anchors_in(&html)?;
    Ok(classify(&anchors))
}
