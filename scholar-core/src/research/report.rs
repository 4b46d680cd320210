//! Report descriptor, the renderer seam and output naming.

use super::analysis::AnalysisResult;
use super::document::{Document, truncate_chars};
use super::structure::{ReportSection, strip_inline_markup, structure_narrative};
use super::validation::ValidationResult;
use crate::error::RenderError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reference snippets longer than this are cut and suffixed with `...`.
pub const REFERENCE_SNIPPET_CHARS: usize = 150;
/// Themes shown in the analysis section of a rendered report.
pub const REPORT_THEMES: usize = 8;
/// Keywords shown in the analysis section of a rendered report.
pub const REPORT_KEYWORDS: usize = 12;
/// Maximum length of the topic fragment in a report file name.
pub const SAFE_TOPIC_CHARS: usize = 50;

/// Validation status recorded when formatting failed.
pub const STATUS_ERROR: &str = "error";

/// Summary of the formatted report, as exposed in the terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedReport {
    pub title: String,
    /// Length of the narrative, in characters.
    pub summary_length: usize,
    /// The analysis themes.
    pub key_findings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub sources_used: usize,
    /// Document quality, or [`STATUS_ERROR`] for a degraded report.
    pub validation_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FormattedReport {
    pub fn title_for(topic: &str) -> String {
        format!("Research Report: {topic}")
    }

    pub fn new(
        topic: &str,
        summary: &str,
        analysis: &AnalysisResult,
        validation: &ValidationResult,
        sources_used: usize,
    ) -> Self {
        Self {
            title: Self::title_for(topic),
            summary_length: summary.chars().count(),
            key_findings: analysis.themes.clone(),
            keywords: analysis.keywords.iter().take(10).cloned().collect(),
            sources_used,
            validation_status: validation.document_quality.to_string(),
            validation_score: Some(
                if validation.has_sufficient_sources {
                    "High"
                } else {
                    "Medium"
                }
                .to_string(),
            ),
            error: None,
        }
    }

    /// The report produced when rendering (or anything before it in the
    /// format stage) failed.
    pub fn degraded(
        topic: &str,
        summary: &str,
        key_findings: Vec<String>,
        sources_used: usize,
        cause: &str,
    ) -> Self {
        Self {
            title: Self::title_for(topic),
            summary_length: summary.chars().count(),
            key_findings,
            keywords: Vec::new(),
            sources_used,
            validation_status: STATUS_ERROR.to_string(),
            validation_score: None,
            error: Some(format!("PDF generation failed: {cause}")),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything a renderer needs to lay out one report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub topic: String,
    pub generated_at: DateTime<Utc>,
    pub validation: ValidationResult,
    pub analysis: AnalysisResult,
    pub sections: Vec<ReportSection>,
    pub documents: Vec<Document>,
    /// The unstructured narrative, kept for fallback layouts.
    pub summary: String,
}

impl ReportDocument {
    /// Assemble a report, structuring `summary` into sections.
    pub fn new(
        topic: &str,
        summary: &str,
        analysis: AnalysisResult,
        validation: ValidationResult,
        documents: Vec<Document>,
    ) -> Self {
        Self {
            topic: topic.to_string(),
            generated_at: Utc::now(),
            validation,
            analysis,
            sections: structure_narrative(summary),
            documents,
            summary: summary.to_string(),
        }
    }

    pub fn title(&self) -> String {
        FormattedReport::title_for(&self.topic)
    }

    /// `"Generated on: March 04, 2026 at 14:05"`.
    pub fn generated_on(&self) -> String {
        format!(
            "Generated on: {}",
            self.generated_at.format("%B %d, %Y at %H:%M")
        )
    }

    pub fn top_themes(&self) -> &[String] {
        let n = self.analysis.themes.len().min(REPORT_THEMES);
        &self.analysis.themes[..n]
    }

    /// Up to [`REPORT_KEYWORDS`] keywords joined with `", "`.
    pub fn keyword_line(&self) -> String {
        self.analysis
            .keywords
            .iter()
            .take(REPORT_KEYWORDS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Sufficient-sources verdict as shown to readers.
    pub fn sufficiency_label(&self) -> &'static str {
        if self.validation.has_sufficient_sources {
            "Yes"
        } else {
            "No"
        }
    }

    /// Narrative with markup removed, split into paragraphs on blank lines.
    pub fn plain_paragraphs(&self) -> Vec<String> {
        strip_inline_markup(&self.summary)
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Snippet of a reference source with markup removed and long text shortened.
pub fn reference_snippet(document: &Document) -> String {
    let clean = strip_inline_markup(&document.snippet);
    if clean.chars().count() > REFERENCE_SNIPPET_CHARS {
        format!("{}...", truncate_chars(&clean, REFERENCE_SNIPPET_CHARS))
    } else {
        clean
    }
}

/// Writes a [`ReportDocument`] somewhere and returns the path of the output.
pub trait ReportRenderer: Send + Sync {
    /// Short name used in logs, e.g. `"pdf"`.
    fn name(&self) -> &str;

    fn render(&self, report: &ReportDocument) -> Result<PathBuf, RenderError>;
}

/// Topic reduced to characters safe for a file name.
///
/// Keeps alphanumerics, spaces, `-` and `_`; trailing whitespace is removed
/// and the result capped at [`SAFE_TOPIC_CHARS`] characters.
pub fn safe_topic(topic: &str) -> String {
    let kept: String = topic
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim_end().chars().take(SAFE_TOPIC_CHARS).collect()
}

/// `<dir>/Research_Report_<safe topic>_<YYYYmmdd_HHMMSS>.<extension>`.
pub fn report_file_name(
    dir: &Path,
    topic: &str,
    generated_at: DateTime<Utc>,
    extension: &str,
) -> PathBuf {
    dir.join(format!(
        "Research_Report_{}_{}.{extension}",
        safe_topic(topic),
        generated_at.format("%Y%m%d_%H%M%S")
    ))
}
