//! Typed errors for the scrape pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! failed detail fetch (recoverable) from a failed archive write (fatal to
//! the run).

use std::path::PathBuf;

use thiserror::Error;

/// A page could not be fetched.
#[derive(Debug, Error)]
#[error("failed to fetch {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: FetchCause) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, FetchCause::Timeout)
    }
}

/// Why a fetch failed.
#[derive(Debug, Error)]
pub enum FetchCause {
    /// Server answered with a non-2xx status
    #[error("HTTP {0}")]
    Status(u16),

    /// Request did not complete within its timeout
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or body read failure
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// URL could not be parsed or resolved
    #[error("invalid URL")]
    InvalidUrl,
}

/// Errors that end a single scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Listing page fetch failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// HTML structure could not be processed
    #[error("parse error: {reason}")]
    Parse { reason: String },

    /// Archive read/write/rotate failure
    #[error("archive I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The background scheduler could not be created or started
    #[error("scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}

impl ScrapeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for pipeline operations.
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;
