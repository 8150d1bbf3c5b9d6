/*!
 * Offline provider used by the pipeline tests.
 *
 * By default it answers a batch prompt with its own `<id>\t<text>` lines,
 * which makes a run an identity translation. A `responder` function or one
 * of the failure modes changes that. Every prompt is recorded.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::core::PromptCompleter;

#[derive(Debug, Clone)]
pub struct MockRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    Working,
    /// Request number `n-1`, `2n-1`, ... fails with a 503
    Intermittent { fail_every: usize },
    /// Every request fails with a connection error
    Failing,
    /// Every completion is the empty string
    Empty,
    /// Answers like `Working` after a delay
    Slow { delay_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Shared between clones
    request_count: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
    responder: Option<fn(&str) -> String>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            responder: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Answers each prompt with `responder(prompt)`
    pub fn scripted(responder: fn(&str) -> String) -> Self {
        Self::working().with_responder(responder)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    pub fn with_responder(mut self, responder: fn(&str) -> String) -> Self {
        self.responder = Some(responder);
        self
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every prompt received
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Echo every `<id>\t<text>` line of a batch prompt, or the last line of a retry prompt
    pub fn echo(prompt: &str) -> String {
        let tagged: Vec<&str> = prompt
            .lines()
            .filter(|line| {
                line.split_once('\t')
                    .is_some_and(|(id, _)| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
            })
            .collect();
        if tagged.is_empty() {
            prompt.lines().last().unwrap_or_default().to_string()
        } else {
            tagged.join("\n")
        }
    }

    fn respond(&self, prompt: &str) -> String {
        match self.responder {
            Some(responder) => responder(prompt),
            None => Self::echo(prompt),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(request.prompt.clone());

        let text = match self.behavior {
            MockBehavior::Failing => {
                return Err(ProviderError::ConnectionError("mock provider is down".to_string()));
            }
            MockBehavior::Intermittent { fail_every } if count % fail_every == fail_every - 1 => {
                return Err(ProviderError::ApiError {
                    status_code: 503,
                    message: format!("mock outage on request {}", count + 1),
                });
            }
            MockBehavior::Empty => String::new(),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                self.respond(&request.prompt)
            }
            MockBehavior::Working | MockBehavior::Intermittent { .. } => self.respond(&request.prompt),
        };
        Ok(MockResponse { text })
    }

    async fn test_connection(&self, _model: &str) -> Result<(), ProviderError> {
        if self.behavior == MockBehavior::Failing {
            return Err(ProviderError::ConnectionError("mock provider is down".to_string()));
        }
        Ok(())
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}

#[async_trait]
impl PromptCompleter for MockProvider {
    async fn complete_prompt(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        let request = MockRequest {
            prompt: prompt.to_string(),
            max_tokens,
        };
        self.complete(request).await.map(|response| Self::extract_text(&response))
    }
}
