//! # Scholar Tools
//!
//! Concrete collaborators for the Scholar research pipeline: web search tiers
//! and report renderers.

pub mod duckduckgo;
pub mod markdown;
pub mod pdf;
pub mod tavily;

pub use duckduckgo::DuckDuckGoSearch;
pub use markdown::MarkdownRenderer;
pub use pdf::PdfRenderer;
pub use tavily::TavilySearch;

use scholar_core::config::{ReportConfig, ReportFormat, SearchConfig};
use scholar_core::error::{RenderError, SearchError};
use scholar_core::research::report::report_file_name;
use scholar_core::research::{ReportDocument, ReportRenderer, SearchProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const USER_AGENT: &str = concat!("Scholar/", env!("CARGO_PKG_VERSION"));

pub(crate) fn http_client(provider: &str, timeout: Duration) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SearchError::Request {
            provider: provider.to_string(),
            message: format!("Failed to create HTTP client: {e}"),
        })
}

/// Create `dir` if needed and return the report path inside it.
pub(crate) fn prepare_output_path(
    dir: &Path,
    report: &ReportDocument,
    extension: &str,
) -> Result<PathBuf, RenderError> {
    std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(report_file_name(dir, &report.topic, report.generated_at, extension))
}

/// Search tiers in fallback order: Tavily, then DuckDuckGo when enabled.
///
/// A tier whose HTTP client cannot be built is left out with a warning.
pub fn build_search_tiers(config: &SearchConfig) -> Vec<Arc<dyn SearchProvider>> {
    let mut tiers: Vec<Arc<dyn SearchProvider>> = Vec::new();
    match TavilySearch::new(config) {
        Ok(tavily) => tiers.push(Arc::new(tavily)),
        Err(e) => warn!(error = %e, "Tavily search unavailable"),
    }
    if config.enable_duckduckgo {
        match DuckDuckGoSearch::new(config) {
            Ok(ddg) => tiers.push(Arc::new(ddg)),
            Err(e) => warn!(error = %e, "DuckDuckGo search unavailable"),
        }
    }
    tiers
}

/// Renderer for the configured output format.
pub fn create_renderer(config: &ReportConfig) -> Arc<dyn ReportRenderer> {
    match config.format {
        ReportFormat::Pdf => Arc::new(PdfRenderer::new(config)),
        ReportFormat::Markdown => Arc::new(MarkdownRenderer::new(&config.output_dir)),
    }
}
