//! One scrape run, end to end.
//!
//! ```text
//! rotate ──► fetch listing ──► extract candidates ──► enrich (bounded fan-out)
//!        ──► persist snapshot ──► prune history
//! ```
//!
//! The steps are strictly sequential; nothing is written until every
//! enrichment task has finished. A listing fetch failure or archive error ends
//! the run with an error and leaves the current slot empty until the next
//! successful run.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};
use url::Url;

use crate::archive::ArchiveRotator;
use crate::config::ScraperConfig;
use crate::enrichment::{Enricher, EnrichmentConfig};
use crate::error::ScrapeResult;
use crate::extractor::extract_listing;
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::types::JobRecord;

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub jobs: usize,
    pub with_apply_url: usize,
    /// Where the previous snapshot went, if there was one
    pub archived: Option<PathBuf>,
    pub pruned: usize,
}

pub struct Pipeline {
    config: ScraperConfig,
    fetcher: Arc<dyn PageFetcher>,
    archive: ArchiveRotator,
}

impl Pipeline {
    pub fn new(config: ScraperConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let archive = ArchiveRotator::new(config.archive_dir.clone());
        Self {
            config,
            fetcher,
            archive,
        }
    }

    /// Build a pipeline backed by the HTTP fetcher described by `config`.
    pub fn from_config(config: ScraperConfig) -> ScrapeResult<Self> {
        let mut fetcher = HttpFetcher::new()?;
        if let Some(rps) = config.requests_per_second {
            fetcher = fetcher.with_rate_limit(rps);
        }
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn archive(&self) -> &ArchiveRotator {
        &self.archive
    }

    /// Scrape the listing and return freshly enriched records without
    /// touching the archive.
    pub async fn produce_jobs(&self) -> ScrapeResult<Vec<JobRecord>> {
        let listing_url = &self.config.listing_url;

        let html = self
            .fetcher
            .fetch(listing_url, self.config.listing_timeout)
            .await?;
        info!(url = %listing_url, bytes = html.len(), "Fetched listing page");

        let listing = extract_listing(&html)?;
        info!(
            candidates = listing.candidates.len(),
            strategy = ?listing.strategy,
            "Extracted candidates"
        );

        let mut enricher = Enricher::new(
            Arc::clone(&self.fetcher),
            EnrichmentConfig::from(&self.config),
        );
        match Url::parse(listing_url) {
            Ok(base) => enricher = enricher.with_base_url(base),
            Err(e) => warn!(
                url = %listing_url,
                error = %e,
                "Listing URL is not absolute; detail links fetched as-is"
            ),
        }

        Ok(enricher.enrich(listing.candidates).await)
    }

    /// Rotate, scrape, persist and prune.
    pub async fn run_once(&self) -> ScrapeResult<RunSummary> {
        info!(url = %self.config.listing_url, "Starting scrape run");

        let archived = self.archive.archive_current(Local::now()).await?;
        let current = self.archive.current_path();

        let jobs = self.produce_jobs().await?;
        self.archive.persist(&current, &jobs).await?;

        let pruned = self.archive.prune(self.config.retain_count).await?;

        let summary = RunSummary {
            jobs: jobs.len(),
            with_apply_url: jobs.iter().filter(|j| j.has_apply_url()).count(),
            archived,
            pruned: pruned.len(),
        };
        info!(
            jobs = summary.jobs,
            with_apply_url = summary.with_apply_url,
            pruned = summary.pruned,
            "Scrape run completed"
        );
        Ok(summary)
    }
}
