//! Page fetching.
//!
//! [`PageFetcher`] is the seam between the pipeline and the network. The
//! production implementation, [`HttpFetcher`], uses one pooled reqwest client
//! per pipeline and an optional governor rate limiter so a run stays polite
//! to the listing site even with many enrichment tasks in flight.
//!
//! No retries happen here; a failed fetch is reported once as a
//! [`FetchError`] and the caller decides what that means.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use tracing::debug;

use crate::error::{FetchCause, FetchError, FetchResult};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Browser-like User-Agent; several listing sites refuse obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches raw HTML bodies.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return its body, failing on transport errors, non-2xx
    /// statuses, or when `timeout` elapses.
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<String>;
}

/// reqwest-backed fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
    limiter: Option<Arc<DefaultRateLimiter>>,
}

impl HttpFetcher {
    pub fn new() -> FetchResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::new("<client>", FetchCause::Transport(Box::new(e))))?;

        Ok(Self {
            client,
            limiter: None,
        })
    }

    /// Use a preconfigured client (tests, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Cap outbound requests per second. Zero disables the limiter.
    pub fn with_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.limiter = NonZeroU32::new(requests_per_second)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));
        self
    }

    async fn wait_for_permit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<String> {
        let parsed =
            url::Url::parse(url).map_err(|_| FetchError::new(url, FetchCause::InvalidUrl))?;

        self.wait_for_permit().await;

        debug!(url = %url, "HTTP fetch starting");
        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::new(url, cause_from(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchCause::Status(status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(url, cause_from(e)))?;

        debug!(url = %url, bytes = body.len(), "HTTP fetch completed");
        Ok(body)
    }
}

fn cause_from(err: reqwest::Error) -> FetchCause {
    if err.is_timeout() {
        FetchCause::Timeout
    } else {
        FetchCause::Transport(Box::new(err))
    }
}
