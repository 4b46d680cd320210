//! Markdown report rendering. Same sections as the PDF, no fonts required.

use crate::prepare_output_path;
use scholar_core::error::RenderError;
use scholar_core::research::report::reference_snippet;
use scholar_core::research::{ReportDocument, ReportRenderer, SectionBlock};
use std::path::{Path, PathBuf};

pub struct MarkdownRenderer {
    output_dir: PathBuf,
}

impl MarkdownRenderer {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }
}

impl ReportRenderer for MarkdownRenderer {
    fn name(&self) -> &str {
        "markdown"
    }

    fn render(&self, report: &ReportDocument) -> Result<PathBuf, RenderError> {
        let path = prepare_output_path(&self.output_dir, report, "md")?;
        std::fs::write(&path, to_markdown(report)).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Render the whole report as a Markdown document.
pub fn to_markdown(report: &ReportDocument) -> String {
    let mut out = String::new();
    let v = &report.validation;

    out.push_str(&format!(
        "# Research Report\n\n## {}\n\n_{}_\n\n",
        report.topic,
        report.generated_on()
    ));

    out.push_str("## Research Quality Assessment\n\n");
    out.push_str(&format!("- **Source Quality:** {}\n", v.document_quality));
    out.push_str(&format!("- **Sources Analyzed:** {}\n", v.source_count));
    out.push_str(&format!("- **Themes Identified:** {}\n", v.theme_count));
    out.push_str(&format!("- **Sufficient Sources:** {}\n\n", report.sufficiency_label()));
    out.push_str("### Recommendations\n\n");
    for rec in &v.recommendations {
        out.push_str(&format!("- {rec}\n"));
    }

    out.push_str("\n## Analysis Results\n\n### Key Themes Identified\n\n");
    for theme in report.top_themes() {
        out.push_str(&format!("- {theme}\n"));
    }
    out.push_str(&format!("\n### Top Keywords\n\n{}\n\n", report.keyword_line()));

    out.push_str("## Executive Summary\n\n");
    for section in &report.sections {
        if let Some(heading) = section.heading() {
            out.push_str(&format!("### {heading}\n\n"));
        }
        for block in section.blocks() {
            match block {
                SectionBlock::Bullet(text) => out.push_str(&format!("- {text}\n")),
                SectionBlock::Paragraph(text) => out.push_str(&format!("{text}\n\n")),
            }
        }
        if section.is_bulleted {
            out.push('\n');
        }
    }

    if !report.documents.is_empty() {
        out.push_str("## Reference Sources\n\n");
        for (i, doc) in report.documents.iter().enumerate() {
            out.push_str(&format!(
                "**Source {}: {}**  \n_Domain: {}_  \n{}\n\n",
                i + 1,
                doc.title,
                doc.source_domain,
                reference_snippet(doc)
            ));
        }
    }

    out
}
