use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ClientSettings, Provider, RateLimiter, RetryPolicy, join_endpoint, send_json};
use crate::errors::ProviderError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic messages API
#[derive(Debug)]
pub struct Anthropic {
    client: Client,
    api_key: String,
    /// Base URL; empty means `https://api.anthropic.com`
    endpoint: String,
    retry: RetryPolicy,
    limiter: RateLimiter,
}

/// Body of a `v1/messages` call
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Required by the API, unlike the OpenAI equivalent
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

/// Token counts reported with every reply
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<AnthropicContent>,
    pub usage: TokenUsage,
}

/// One content block; only `text` blocks carry a completion
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: String,
}

impl AnthropicRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens,
        }
    }

    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Anthropic {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, settings: &ClientSettings) -> Self {
        Self {
            client: settings.http_client(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            retry: settings.retry_policy(),
            limiter: RateLimiter::new(settings.rate_limit),
        }
    }

    /// Minimal request used to check credentials and model access
    fn connection_request(model: &str) -> AnthropicRequest {
        AnthropicRequest::new(model, 10).add_message("user", "Hello")
    }

    fn messages_url(&self) -> String {
        let endpoint = if self.endpoint.is_empty() {
            "https://api.anthropic.com"
        } else {
            self.endpoint.as_str()
        };
        join_endpoint(endpoint, "v1/messages")
    }
}

#[async_trait]
impl Provider for Anthropic {
    type Request = AnthropicRequest;
    type Response = AnthropicResponse;

    async fn complete(&self, request: AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let url = self.messages_url();
        self.retry
            .run("Anthropic", || async {
                self.limiter.acquire().await;
                let builder = self
                    .client
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&request);
                send_json::<AnthropicResponse>(builder, "Anthropic").await
            })
            .await
    }

    async fn test_connection(&self, model: &str) -> Result<(), ProviderError> {
        self.complete(Self::connection_request(model)).await.map(|_| ())
    }

    fn extract_text(response: &AnthropicResponse) -> String {
        response
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text.as_str())
            .collect()
    }
}
