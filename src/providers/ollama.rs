use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ClientSettings, Provider, RateLimiter, RetryPolicy, join_endpoint, send_json};
use crate::errors::ProviderError;

/// Client for a local or remote Ollama server
#[derive(Debug)]
pub struct Ollama {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
    limiter: RateLimiter,
}

/// Body of `api/generate`, always non-streaming
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    stream: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Ollama's name for the output token cap
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Reply of `api/generate`; token counts are absent on cached prompts
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: None,
            stream: false,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    pub fn num_predict(mut self, num_predict: u32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).num_predict = Some(num_predict);
        self
    }
}

impl Ollama {
    /// `endpoint` may omit the scheme; empty means localhost
    pub fn new(endpoint: impl Into<String>, settings: &ClientSettings) -> Self {
        let endpoint = endpoint.into();
        let base_url = if endpoint.is_empty() {
            "http://localhost:11434".to_string()
        } else if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint
        } else {
            format!("http://{}", endpoint)
        };

        // Local models can be slow to load
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .http1_only()
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            base_url,
            client,
            retry: settings.retry_policy(),
            limiter: RateLimiter::new(settings.rate_limit),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Server version, used as a cheap reachability probe
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = join_endpoint(&self.base_url, "api/version");
        let response = send_json::<VersionResponse>(self.client.get(url), "Ollama").await?;
        Ok(response.version)
    }
}

#[async_trait]
impl Provider for Ollama {
    type Request = GenerationRequest;
    type Response = GenerationResponse;

    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = join_endpoint(&self.base_url, "api/generate");
        self.retry
            .run("Ollama", || async {
                self.limiter.acquire().await;
                send_json::<GenerationResponse>(self.client.post(&url).json(&request), "Ollama").await
            })
            .await
    }

    async fn test_connection(&self, _model: &str) -> Result<(), ProviderError> {
        let version = self.version().await?;
        debug!("Connected to Ollama {}", version);
        Ok(())
    }

    fn extract_text(response: &GenerationResponse) -> String {
        response.response.clone()
    }
}
