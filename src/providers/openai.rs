use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ClientSettings, Provider, RateLimiter, RetryPolicy, join_endpoint, send_json};
use crate::errors::ProviderError;

/// OpenAI client for the chat completions API
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    retry: RetryPolicy,
    limiter: RateLimiter,
}

/// Chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// One chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    #[serde(default)]
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIRequest {
    /// Create a new request for `model`
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the token budget
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, settings: &ClientSettings) -> Self {
        Self {
            client: settings.http_client(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            retry: settings.retry_policy(),
            limiter: RateLimiter::new(settings.rate_limit),
        }
    }

    fn completions_url(&self) -> String {
        let endpoint = if self.endpoint.is_empty() {
            "https://api.openai.com/v1"
        } else {
            self.endpoint.as_str()
        };
        join_endpoint(endpoint, "chat/completions")
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let url = self.completions_url();
        self.retry
            .run("OpenAI", || async {
                self.limiter.acquire().await;
                let builder = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&request);
                send_json::<OpenAIResponse>(builder, "OpenAI").await
            })
            .await
    }

    async fn test_connection(&self, _model: &str) -> Result<(), ProviderError> {
        let url = join_endpoint(
            if self.endpoint.is_empty() { "https://api.openai.com/v1" } else { &self.endpoint },
            "models",
        );
        let builder = self.client.get(url).bearer_auth(&self.api_key);
        send_json::<serde_json::Value>(builder, "OpenAI").await.map(|_| ())
    }

    fn extract_text(response: &OpenAIResponse) -> String {
        response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }
}
