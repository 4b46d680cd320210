//! LLM provider abstraction.
//!
//! Defines the `LlmProvider` trait for model-agnostic completions and a
//! queue-driven `MockLlmProvider` used throughout the test suites.

use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse, Message, TokenUsage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Trait for LLM providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Perform a full completion and return the response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Return the model name.
    fn model_name(&self) -> &str;

    /// Send a single prompt and return the trimmed response text.
    ///
    /// Blank responses are reported as `LlmError::EmptyResponse`.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.complete(CompletionRequest::from_prompt(prompt)).await?;
        let text = response.message.text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

/// A mock LLM provider for testing.
///
/// Responses are returned in FIFO order. When the queue is empty a canned
/// text response is returned, unless the provider was built with
/// [`MockLlmProvider::failing`].
pub struct MockLlmProvider {
    model: String,
    responses: Mutex<VecDeque<Result<CompletionResponse, String>>>,
    fail_when_empty: bool,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            responses: Mutex::new(VecDeque::new()),
            fail_when_empty: false,
        }
    }

    /// Create a MockLlmProvider that always returns the given text.
    pub fn with_response(text: &str) -> Self {
        let provider = Self::new();
        for _ in 0..20 {
            provider.queue_response(Self::text_response(text));
        }
        provider
    }

    /// Create a provider whose every call fails with a connection error.
    pub fn failing() -> Self {
        Self {
            fail_when_empty: true,
            ..Self::new()
        }
    }

    /// Queue a response to be returned by the next `complete` call.
    pub fn queue_response(&self, response: CompletionResponse) {
        self.lock().push_back(Ok(response));
    }

    /// Queue a failure to be returned by the next `complete` call.
    pub fn queue_error(&self, message: impl Into<String>) {
        self.lock().push_back(Err(message.into()));
    }

    /// Create a simple text response for testing.
    pub fn text_response(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            model: "mock-model".to_string(),
            finish_reason: Some("stop".to_string()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<CompletionResponse, String>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        match self.lock().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(LlmError::Connection { message }),
            None if self.fail_when_empty => Err(LlmError::Connection {
                message: "mock provider configured to fail".to_string(),
            }),
            None => Ok(Self::text_response(
                "I'm a mock LLM. No queued responses available.",
            )),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default_response() {
        let provider = MockLlmProvider::new();
        let response = provider.complete(CompletionRequest::default()).await.unwrap();
        assert!(response.message.text.contains("mock LLM"));
    }

    #[tokio::test]
    async fn test_mock_provider_queued_responses() {
        let provider = MockLlmProvider::new();
        provider.queue_response(MockLlmProvider::text_response("first"));
        provider.queue_response(MockLlmProvider::text_response("second"));

        assert_eq!(provider.generate("q").await.unwrap(), "first");
        assert_eq!(provider.generate("q").await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_mock_provider_queued_error() {
        let provider = MockLlmProvider::new();
        provider.queue_error("boom");
        let err = provider.generate("q").await.unwrap_err();
        assert!(matches!(err, LlmError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = MockLlmProvider::failing();
        assert!(provider.generate("q").await.is_err());
        assert!(provider.generate("q").await.is_err());
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_text() {
        let provider = MockLlmProvider::new();
        provider.queue_response(MockLlmProvider::text_response("   \n"));
        let err = provider.generate("q").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_generate_trims_text() {
        let provider = MockLlmProvider::with_response("  summary body \n");
        assert_eq!(provider.generate("q").await.unwrap(), "summary body");
        assert_eq!(provider.model_name(), "mock-model");
    }
}
