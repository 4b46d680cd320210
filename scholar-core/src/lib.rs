//! # Scholar Core
//!
//! Core library for the Scholar research assistant.
//! Provides the research pipeline (search, analysis, validation, summary,
//! formatting), the LLM interface (brain), configuration, and the report
//! data model.

pub mod brain;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod research;
pub mod types;

// Re-export commonly used types at the crate root.
pub use brain::{LlmProvider, MockLlmProvider};
pub use config::{ReportFormat, ScholarConfig, check_api_keys, load_config};
pub use error::{ConfigError, LlmError, RenderError, Result, ScholarError, SearchError};
pub use pipeline::{NoOpCallback, Pipeline, PipelineCallback, PipelinePhase, WorkflowState};
pub use providers::{create_provider, create_provider_or_unavailable};
pub use research::{
    AnalysisResult, ContentQuality, Document, DocumentQuality, FormattedReport, ReportDocument,
    ReportRenderer, ReportSection, SearchProvider, ValidationResult,
};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, TokenUsage};
