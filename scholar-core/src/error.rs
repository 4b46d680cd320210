//! Error types for the Scholar core library.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering the LLM, search, rendering, and configuration collaborators.

use std::path::PathBuf;

/// Top-level error type for the Scholar core library.
#[derive(Debug, thiserror::Error)]
pub enum ScholarError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from LLM provider interactions.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },

    #[error("Provider returned no text")]
    EmptyResponse,
}

/// Errors from search providers.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search request to {provider} failed: {message}")]
    Request { provider: String, message: String },

    #[error("Could not parse {provider} response: {message}")]
    Parse { provider: String, message: String },

    #[error("No API key for {provider} (env var '{env_var}' not set)")]
    MissingApiKey { provider: String, env_var: String },

    #[error("HTTP {status} from {provider}: {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },
}

/// Errors from report renderers.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("No usable font '{name}' found in {searched:?}")]
    FontUnavailable { name: String, searched: Vec<PathBuf> },

    #[error("Layout failed: {message}")]
    Layout { message: String },

    #[error("Could not write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// A type alias for results using the top-level `ScholarError`.
pub type Result<T> = std::result::Result<T, ScholarError>;
