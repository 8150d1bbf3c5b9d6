/*!
 * Provider implementations for the completion services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - OpenAI: chat completions API (default)
 * - Anthropic: messages API
 * - Ollama: local generate API
 * - Mock: scripted provider for tests
 *
 * Every client shares the same transport behavior: a per-request timeout,
 * client-side rate limiting, and exponential backoff on retryable failures.
 */

use async_trait::async_trait;
use log::warn;
use parking_lot::Mutex;
use rand::Rng;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider with the configured `model`
    async fn test_connection(&self, model: &str) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Transport settings shared by the HTTP clients
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Maximum number of retry attempts after the first try
    pub retry_count: u32,
    /// Base backoff, doubled on every retry
    pub retry_backoff_ms: u64,
    /// Optional rate limit in requests per minute
    pub rate_limit: Option<u32>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            retry_count: 3,
            retry_backoff_ms: 1000,
            rate_limit: None,
        }
    }
}

impl ClientSettings {
    /// Build the HTTP client for these settings
    pub fn http_client(&self) -> Client {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs.max(1)))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_default()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry_count,
            backoff_base_ms: self.retry_backoff_ms,
        }
    }
}

/// Exponential backoff for retryable provider errors
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first try
    pub max_retries: u32,
    /// Base backoff time in milliseconds
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// Random extra delay of up to a quarter of the base backoff
    fn jitter(&self) -> Duration {
        let spread = self.backoff_base_ms / 4;
        if spread == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=spread))
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt) + self.jitter();
                    warn!(
                        "{} request failed: {} - attempt {}/{}, retrying in {:?}",
                        label,
                        e,
                        attempt + 1,
                        self.max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Spaces requests out to stay under a requests-per-minute budget
#[derive(Debug)]
pub struct RateLimiter {
    interval: Option<Duration>,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: Option<u32>) -> Self {
        let interval = requests_per_minute
            .filter(|rpm| *rpm > 0)
            .map(|rpm| Duration::from_millis(60_000 / rpm as u64));
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait until the next request slot is available
    pub async fn acquire(&self) {
        let Some(interval) = self.interval else {
            return;
        };

        let wait = {
            let mut next_slot = self.next_slot.lock();
            let now = Instant::now();
            let slot = match *next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next_slot = Some(slot + interval);
            slot - now
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

/// Send a request and decode a JSON body, mapping failures to `ProviderError`
pub(crate) async fn send_json<T: DeserializeOwned>(
    builder: RequestBuilder,
    label: &str,
) -> Result<T, ProviderError> {
    let response = builder
        .send()
        .await
        .map_err(|e| ProviderError::ConnectionError(format!("{} request failed: {}", label, e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::ConnectionError(format!("{} response body: {}", label, e)))?;

    if !status.is_success() {
        return Err(ProviderError::from_status(status.as_u16(), body));
    }

    serde_json::from_str::<T>(&body).map_err(|e| {
        let snippet: String = body.chars().take(500).collect();
        ProviderError::ParseError(format!("{} response: {} (body: {})", label, e, snippet))
    })
}

/// Join a base endpoint and a path without doubling slashes
pub(crate) fn join_endpoint(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
