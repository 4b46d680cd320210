//! LLM provider implementations.
//!
//! Provides concrete implementations of the `LlmProvider` trait for:
//! - Google Gemini API (Gemini models)
//! - OpenAI-compatible APIs (OpenAI, Ollama, vLLM, LM Studio)
//!
//! Use `create_provider()` to instantiate the appropriate provider based on config.

pub mod gemini;
pub mod openai_compat;

use crate::brain::LlmProvider;
use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatibleProvider;

/// Create the provider named by `config.provider`.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.provider.as_str() {
        "gemini" | "google" => Ok(Arc::new(GeminiProvider::new(config)?)),
        "openai" | "local" => Ok(Arc::new(OpenAiCompatibleProvider::new(config)?)),
        other => Err(LlmError::ApiRequest {
            message: format!("Unknown LLM provider '{}'", other),
        }),
    }
}

/// Like [`create_provider`], but a provider that cannot be built is replaced
/// by one that fails every call, so a run can still complete with its
/// placeholder summary.
pub fn create_provider_or_unavailable(config: &LlmConfig) -> Arc<dyn LlmProvider> {
    create_provider(config).unwrap_or_else(|e| {
        warn!(provider = %config.provider, error = %e, "LLM provider unavailable");
        Arc::new(UnavailableProvider {
            model: config.model.clone(),
            reason: e.to_string(),
        })
    })
}

/// Stand-in for a provider that could not be configured.
pub struct UnavailableProvider {
    model: String,
    reason: String,
}

#[async_trait]
impl LlmProvider for UnavailableProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::Connection {
            message: self.reason.clone(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_unknown() {
        let config = LlmConfig {
            provider: "cohere".into(),
            ..Default::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(err.to_string().contains("cohere"));
    }

    #[test]
    fn test_create_provider_missing_key() {
        let config = LlmConfig {
            api_key_env: "SCHOLAR_TEST_SURELY_UNSET_KEY".into(),
            ..Default::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, LlmError::AuthFailed { .. }));
    }

    #[tokio::test]
    async fn test_unavailable_provider_fails_every_call() {
        let config = LlmConfig {
            api_key_env: "SCHOLAR_TEST_SURELY_UNSET_KEY".into(),
            ..Default::default()
        };
        let provider = create_provider_or_unavailable(&config);
        assert_eq!(provider.model_name(), "gemini-2.5-flash");
        let err = provider.generate("hello").await.unwrap_err();
        assert!(err.to_string().contains("SCHOLAR_TEST_SURELY_UNSET_KEY"));
    }
}
