//! PDF report rendering with `genpdf`.
//!
//! The full layout has a cover page, quality assessment, analysis results,
//! the structured executive summary and the reference list. If rendering it
//! fails, a plain one-section PDF is written to the same path instead.

use crate::prepare_output_path;
use genpdf::elements::{Break, PageBreak, Paragraph, UnorderedList};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use genpdf::{Alignment, Document, SimplePageDecorator};
use scholar_core::config::ReportConfig;
use scholar_core::error::RenderError;
use scholar_core::research::report::reference_snippet;
use scholar_core::research::{ReportDocument, ReportRenderer, SectionBlock};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PAGE_MARGIN: i32 = 30;

fn title_style() -> Style {
    Style::new().bold().with_font_size(20)
}

fn heading1() -> Style {
    Style::new().bold().with_font_size(16)
}

fn heading2() -> Style {
    Style::new().bold().with_font_size(13)
}

pub struct PdfRenderer {
    output_dir: PathBuf,
    font_name: String,
    font_dirs: Vec<PathBuf>,
}

impl PdfRenderer {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            font_name: config.font_name.clone(),
            font_dirs: config.font_dirs.clone(),
        }
    }

    /// Load the font family from the first directory that holds it.
    pub fn load_fonts(&self) -> Result<FontFamily<FontData>, RenderError> {
        for dir in &self.font_dirs {
            match genpdf::fonts::from_files(dir, &self.font_name, None) {
                Ok(family) => {
                    debug!(dir = %dir.display(), font = %self.font_name, "Loaded font family");
                    return Ok(family);
                }
                Err(e) => debug!(dir = %dir.display(), error = %e, "Font not found"),
            }
        }
        Err(RenderError::FontUnavailable {
            name: self.font_name.clone(),
            searched: self.font_dirs.clone(),
        })
    }

    fn write(doc: Document, path: &Path) -> Result<(), genpdf::error::Error> {
        doc.render_to_file(path)
    }
}

impl ReportRenderer for PdfRenderer {
    fn name(&self) -> &str {
        "pdf"
    }

    fn render(&self, report: &ReportDocument) -> Result<PathBuf, RenderError> {
        let fonts = self.load_fonts()?;
        let path = prepare_output_path(&self.output_dir, report, "pdf")?;

        match Self::write(full_layout(report, fonts.clone()), &path) {
            Ok(()) => Ok(path),
            Err(e) => {
                warn!(error = %e, "Full PDF layout failed, writing simple report");
                Self::write(simple_layout(report, fonts), &path).map_err(|fallback| {
                    RenderError::Layout {
                        message: format!("{e}; simple layout also failed: {fallback}"),
                    }
                })?;
                Ok(path)
            }
        }
    }
}

fn new_document(report: &ReportDocument, fonts: FontFamily<FontData>) -> Document {
    let mut doc = Document::new(fonts);
    doc.set_title(report.title());
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(PAGE_MARGIN);
    doc.set_page_decorator(decorator);
    doc
}

fn bullets<I, S>(items: I) -> UnorderedList
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut list = UnorderedList::new();
    for item in items {
        list.push(Paragraph::new(item.into()));
    }
    list
}

fn full_layout(report: &ReportDocument, fonts: FontFamily<FontData>) -> Document {
    let mut doc = new_document(report, fonts);

    // Cover
    doc.push(Break::new(6));
    doc.push(
        Paragraph::new(StyledString::new("Research Report", title_style())).aligned(Alignment::Center),
    );
    doc.push(Break::new(1));
    doc.push(
        Paragraph::new(StyledString::new(report.topic.clone(), title_style()))
            .aligned(Alignment::Center),
    );
    doc.push(Break::new(2));
    doc.push(Paragraph::new(report.generated_on()).aligned(Alignment::Center));
    doc.push(PageBreak::new());

    // Quality assessment
    let v = &report.validation;
    doc.push(Paragraph::new(StyledString::new("Research Quality Assessment", heading1())));
    doc.push(Break::new(1));
    for line in [
        format!("Source Quality: {}", v.document_quality),
        format!("Sources Analyzed: {}", v.source_count),
        format!("Themes Identified: {}", v.theme_count),
        format!("Sufficient Sources: {}", report.sufficiency_label()),
    ] {
        doc.push(Paragraph::new(line));
    }
    doc.push(Break::new(1));
    doc.push(Paragraph::new(StyledString::new("Recommendations:", heading2())));
    doc.push(bullets(v.recommendations.iter().cloned()));
    doc.push(PageBreak::new());

    // Analysis
    doc.push(Paragraph::new(StyledString::new("Analysis Results", heading1())));
    doc.push(Break::new(1));
    doc.push(Paragraph::new(StyledString::new("Key Themes Identified:", heading2())));
    doc.push(bullets(report.top_themes().iter().cloned()));
    doc.push(Break::new(1));
    doc.push(Paragraph::new(StyledString::new("Top Keywords:", heading2())));
    doc.push(Paragraph::new(report.keyword_line()));
    doc.push(PageBreak::new());

    // Executive summary
    doc.push(Paragraph::new(StyledString::new("Executive Summary", heading1())));
    doc.push(Break::new(1));
    for section in &report.sections {
        if let Some(heading) = section.heading() {
            doc.push(Paragraph::new(StyledString::new(heading, heading2())));
            doc.push(Break::new(0.5));
        }
        let blocks = section.blocks();
        if section.is_bulleted {
            doc.push(bullets(blocks.iter().map(|b| b.text().to_string())));
        } else {
            for block in &blocks {
                if let SectionBlock::Paragraph(text) = block {
                    doc.push(Paragraph::new(text.clone()));
                    doc.push(Break::new(0.3));
                }
            }
        }
        doc.push(Break::new(1));
    }

    // References
    if !report.documents.is_empty() {
        doc.push(PageBreak::new());
        doc.push(Paragraph::new(StyledString::new("Reference Sources", heading1())));
        doc.push(Break::new(1));
        for (i, source) in report.documents.iter().enumerate() {
            doc.push(Paragraph::new(StyledString::new(
                format!("Source {}: {}", i + 1, source.title),
                Style::new().bold(),
            )));
            doc.push(Paragraph::new(StyledString::new(
                format!("Domain: {}", source.source_domain),
                Style::new().italic(),
            )));
            doc.push(Paragraph::new(reference_snippet(source)));
            doc.push(Break::new(1));
        }
    }

    doc
}

fn simple_layout(report: &ReportDocument, fonts: FontFamily<FontData>) -> Document {
    let mut doc = new_document(report, fonts);
    doc.push(Paragraph::new(StyledString::new(report.title(), heading1())));
    doc.push(Break::new(1));
    doc.push(Paragraph::new(report.generated_on()));
    doc.push(Break::new(2));
    doc.push(Paragraph::new(StyledString::new("Executive Summary", heading2())));
    doc.push(Break::new(1));
    for paragraph in report.plain_paragraphs() {
        doc.push(Paragraph::new(paragraph));
        doc.push(Break::new(0.5));
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::research::validation::validate_counts;
    use scholar_core::research::{AnalysisResult, Document as ResearchDocument};
    use tempfile::TempDir;

    fn report() -> ReportDocument {
        ReportDocument::new(
            "rust memory safety",
            "# Introduction\nRust prevents data races.\n# Key Insights\n- ownership\n- borrowing",
            AnalysisResult {
                keywords: vec!["rust".into(), "memory".into()],
                themes: vec!["Ownership".into()],
                num_sources: 1,
                content_quality: None,
                summary: None,
            },
            validate_counts(1, 1),
            vec![ResearchDocument::placeholder("rust memory safety")],
        )
    }

    fn renderer(output: &Path, font_dirs: Vec<PathBuf>) -> PdfRenderer {
        PdfRenderer::new(&ReportConfig {
            output_dir: output.to_path_buf(),
            font_dirs,
            ..Default::default()
        })
    }

    #[test]
    fn test_missing_fonts_is_an_error() {
        let dir = TempDir::new().unwrap();
        let r = renderer(&dir.path().join("out"), vec![dir.path().to_path_buf()]);
        let err = r.render(&report()).unwrap_err();
        match err {
            RenderError::FontUnavailable { name, searched } => {
                assert_eq!(name, "LiberationSans");
                assert_eq!(searched, vec![dir.path().to_path_buf()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_renders_when_fonts_installed() {
        let dir = TempDir::new().unwrap();
        let r = renderer(dir.path(), ReportConfig::default().font_dirs);
        if r.load_fonts().is_err() {
            // Liberation fonts are not installed on this machine.
            return;
        }
        let path = r.render(&report()).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
