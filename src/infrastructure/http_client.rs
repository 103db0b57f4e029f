//! HTTP client for relay requests with rate limiting
//!
//! A single client is shared by every relay strategy so that one
//! `governor` quota bounds all outgoing relay traffic.

use anyhow::{Context, Result};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use reqwest::{
    Client, Response,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::infrastructure::config::FetchConfig;

/// Rate-limited HTTP client used by the relay strategies
pub struct RelayHttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    max_requests_per_second: u32,
}

impl RelayHttpClient {
    /// Create a new client from the fetch configuration
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.attempt_timeout_seconds))
            .default_headers(headers)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?,
        );

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
            max_requests_per_second: config.max_requests_per_second,
        })
    }

    /// Issue a GET once the rate limiter allows it
    pub async fn get(&self, url: &str) -> Result<Response, reqwest::Error> {
        self.rate_limiter.until_ready().await;

        tracing::debug!("Fetching relay URL: {}", url);
        let response = self.client.get(url).send().await?;
        tracing::debug!("Relay answered {} for {}", response.status(), url);
        Ok(response)
    }

    pub fn max_requests_per_second(&self) -> u32 {
        self.max_requests_per_second
    }
}
