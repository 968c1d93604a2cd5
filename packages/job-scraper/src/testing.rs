//! Mock implementations for testing.
//!
//! [`MockFetcher`] serves canned pages keyed by absolute URL, can simulate
//! failing or slow pages, and records every call together with the peak
//! number of fetches that were in flight at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FetchCause, FetchError, FetchResult};
use crate::fetcher::PageFetcher;

#[derive(Debug, Clone)]
enum MockResponse {
    Page(String),
    Status(u16),
    Slow(Duration, String),
}

/// Mock fetcher for testing.
///
/// # Example
///
/// ```rust
/// use job_scraper::testing::MockFetcher;
///
/// let mock = MockFetcher::new()
///     .with_page("https://jobs.example/job/1", r#"<a href="/apply/1">Apply Online</a>"#)
///     .with_status("https://jobs.example/job/2", 500);
/// ```
#[derive(Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    calls: Arc<RwLock<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    /// Applied to every fetch, before any per-URL delay
    latency: Duration,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn add_page(&self, url: impl Into<String>, html: impl Into<String>) {
        self.insert(url.into(), MockResponse::Page(html.into()));
    }

    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.add_page(url, html);
        self
    }

    /// Answer `url` with a non-success status.
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.insert(url.into(), MockResponse::Status(status));
        self
    }

    /// Serve `html` for `url` only after `delay` (on the tokio clock).
    pub fn with_slow_page(
        self,
        url: impl Into<String>,
        delay: Duration,
        html: impl Into<String>,
    ) -> Self {
        self.insert(url.into(), MockResponse::Slow(delay, html.into()));
        self
    }

    /// Add a fixed latency to every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// URLs requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Highest number of fetches observed running concurrently.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn insert(&self, url: String, response: MockResponse) {
        self.responses.write().unwrap().insert(url, response);
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            responses: Arc::clone(&self.responses),
            calls: Arc::clone(&self.calls),
            in_flight: Arc::clone(&self.in_flight),
            peak_in_flight: Arc::clone(&self.peak_in_flight),
            latency: self.latency,
        }
    }
}

/// Decrements the in-flight counter even if the fetch future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let response = self.responses.read().unwrap().get(url).cloned();

        let serve = async {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            match response {
                Some(MockResponse::Page(html)) => Ok(html),
                Some(MockResponse::Slow(delay, html)) => {
                    tokio::time::sleep(delay).await;
                    Ok(html)
                }
                Some(MockResponse::Status(status)) => {
                    Err(FetchError::new(url, FetchCause::Status(status)))
                }
                None => Err(FetchError::new(url, FetchCause::Status(404))),
            }
        };

        tokio::time::timeout(timeout, serve)
            .await
            .unwrap_or_else(|_| Err(FetchError::new(url, FetchCause::Timeout)))
    }
}
