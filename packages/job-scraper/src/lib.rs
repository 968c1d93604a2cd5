//! Job-listing scraper with apply-link enrichment.
//!
//! Periodically scrapes a job-listing page, enriches every posting with the
//! most likely application URL from its detail page, and keeps the results
//! as a rotating JSON archive.
//!
//! # Usage
//!
//! ```rust,ignore
//! use job_scraper::{Pipeline, ScraperConfig};
//!
//! let pipeline = Pipeline::from_config(ScraperConfig::from_env()?)?;
//!
//! // Fresh records, no archive side effects
//! let jobs = pipeline.produce_jobs().await?;
//!
//! // Full run: rotate, scrape, persist, prune
//! let summary = pipeline.run_once().await?;
//! ```
//!
//! # Modules
//!
//! - [`classifier`] - Priority-ranked apply-link selection
//! - [`fetcher`] - Page fetching (HTTP, rate limited)
//! - [`extractor`] - Listing and detail page HTML extraction
//! - [`enrichment`] - Bounded, order-preserving per-job enrichment
//! - [`archive`] - Snapshot rotation, persistence and pruning
//! - [`pipeline`] - One end-to-end scrape run
//! - [`scheduler`] - Periodic, non-overlapping runs
//! - [`query`] - Sorting, paging and searching a snapshot
//! - [`testing`] - Mock fetcher for tests

pub mod archive;
pub mod classifier;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod pipeline;
pub mod query;
pub mod scheduler;
pub mod testing;
pub mod types;

pub use archive::ArchiveRotator;
pub use classifier::{classify, LinkClass};
pub use config::ScraperConfig;
pub use enrichment::{Enricher, EnrichmentConfig};
pub use error::{FetchCause, FetchError, FetchResult, ScrapeError, ScrapeResult};
pub use extractor::{extract, extract_listing, Listing, ListingStrategy};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use pipeline::{Pipeline, RunSummary};
pub use query::{JobCategory, Page};
pub use scheduler::{RunOutcome, RunScheduler, ScrapeRun};
pub use testing::MockFetcher;
pub use types::{Anchor, Candidate, JobRecord, NOT_SPECIFIED};
