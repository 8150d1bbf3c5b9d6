/*!
 * Core translation service implementation.
 *
 * `TranslationService` turns a prompt into completion text using the
 * configured provider. The pipeline only sees the `PromptCompleter` trait,
 * so tests can swap in the mock provider.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::ProviderError;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::{ClientSettings, Provider};

/// Anything that can complete a text prompt
#[async_trait]
pub trait PromptCompleter: Send + Sync {
    /// Send `prompt` as a single user message and return the completion text
    async fn complete_prompt(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError>;
}

/// Running totals over every completion of one run
#[derive(Clone, Debug)]
pub struct TokenUsageStats {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub requests: u64,
    pub start_time: Instant,
    /// Wall time spent waiting on the provider
    pub api_duration: Duration,
    pub provider: String,
    pub model: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::with_provider_info(String::new(), String::new())
    }
}

impl TokenUsageStats {
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            requests: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    /// Missing counts (some backends omit them) are treated as zero
    pub fn record(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>, duration: Duration) {
        let (prompt, completion) = (prompt_tokens.unwrap_or(0), completion_tokens.unwrap_or(0));
        self.prompt_tokens += prompt;
        self.completion_tokens += completion;
        self.total_tokens += prompt + completion;
        self.requests += 1;
        self.api_duration += duration;
    }

    /// Throughput over API time, or over elapsed time before the first reply
    pub fn tokens_per_minute(&self) -> f64 {
        let seconds = match self.api_duration.as_secs_f64() {
            secs if secs > 0.0 => secs,
            _ => self.start_time.elapsed().as_secs_f64(),
        };
        if seconds > 0.0 {
            self.total_tokens as f64 * 60.0 / seconds
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Token usage: {} ({}), {} requests, {} prompt + {} completion = {} tokens, {:.1}s API time, {:.0} tokens/min",
            self.provider,
            self.model,
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            self.api_duration.as_secs_f64(),
            self.tokens_per_minute()
        )
    }
}

#[derive(Debug)]
enum Backend {
    OpenAI(OpenAI),
    Anthropic(Anthropic),
    Ollama(Ollama),
}

/// Completion service backed by the configured provider
#[derive(Debug)]
pub struct TranslationService {
    backend: Backend,
    pub config: TranslationConfig,

    usage: Arc<Mutex<TokenUsageStats>>,
}

impl TranslationService {
    /// Build the client for `config.provider`; no request is sent
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let settings = ClientSettings {
            timeout_secs: config.get_timeout_secs(),
            retry_count: config.common.retry_count,
            retry_backoff_ms: config.common.retry_backoff_ms,
            rate_limit: config.get_rate_limit(),
        };

        let backend = match config.provider {
            ConfigTranslationProvider::OpenAI => {
                Backend::OpenAI(OpenAI::new(config.get_api_key(), config.get_endpoint(), &settings))
            }
            ConfigTranslationProvider::Anthropic => {
                Backend::Anthropic(Anthropic::new(config.get_api_key(), config.get_endpoint(), &settings))
            }
            ConfigTranslationProvider::Ollama => Backend::Ollama(Ollama::new(config.get_endpoint(), &settings)),
        };

        let usage = TokenUsageStats::with_provider_info(
            config.provider.display_name().to_string(),
            config.get_model(),
        );

        Ok(Self {
            backend,
            config,
            usage: Arc::new(Mutex::new(usage)),
        })
    }

    /// Snapshot of the token usage so far
    pub fn usage(&self) -> TokenUsageStats {
        self.usage.lock().clone()
    }

    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        let model = self.config.get_model();
        match &self.backend {
            Backend::OpenAI(client) => client.test_connection(&model).await,
            Backend::Anthropic(client) => client.test_connection(&model).await,
            Backend::Ollama(client) => client.test_connection(&model).await,
        }
    }
}

#[async_trait]
impl PromptCompleter for TranslationService {
    async fn complete_prompt(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        let start_time = Instant::now();
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;

        let (text, prompt_tokens, completion_tokens) = match &self.backend {
            Backend::OpenAI(client) => {
                let request = OpenAIRequest::new(model)
                    .add_message("user", prompt)
                    .temperature(temperature)
                    .max_tokens(max_tokens);
                let response = client.complete(request).await?;
                if response.choices.is_empty() {
                    return Err(ProviderError::ParseError(
                        "OpenAI returned no choices".to_string(),
                    ));
                }
                let usage = response.usage.as_ref();
                (
                    OpenAI::extract_text(&response),
                    usage.map(|u| u.prompt_tokens as u64),
                    usage.map(|u| u.completion_tokens as u64),
                )
            }
            Backend::Anthropic(client) => {
                let request = AnthropicRequest::new(model, max_tokens)
                    .add_message("user", prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                (
                    Anthropic::extract_text(&response),
                    Some(response.usage.input_tokens as u64),
                    Some(response.usage.output_tokens as u64),
                )
            }
            Backend::Ollama(client) => {
                let request = GenerationRequest::new(model, prompt)
                    .temperature(temperature)
                    .num_predict(max_tokens);
                let response = client.complete(request).await?;
                (
                    Ollama::extract_text(&response),
                    response.prompt_eval_count,
                    response.eval_count,
                )
            }
        };

        let duration = start_time.elapsed();
        debug!("Completion received in {:?} ({} chars)", duration, text.len());
        self.usage.lock().record(prompt_tokens, completion_tokens, duration);

        Ok(text)
    }
}
