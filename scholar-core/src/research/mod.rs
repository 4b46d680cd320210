//! Research domain: documents, lexical analysis, validation, narrative
//! structuring and the report descriptor.
//!
//! Everything here is synchronous and free of I/O except the
//! [`SearchProvider`] and [`ReportRenderer`] seams, which concrete
//! collaborators implement elsewhere.

pub mod analysis;
pub mod document;
pub mod prompt;
pub mod report;
pub mod structure;
pub mod validation;

pub use analysis::{AnalysisResult, ContentQuality, analyze_documents};
pub use document::{Document, SearchProvider};
pub use prompt::{build_summary_prompt, summary_placeholder};
pub use report::{FormattedReport, ReportDocument, ReportRenderer, report_file_name};
pub use structure::{ReportSection, SectionBlock, structure_narrative};
pub use validation::{DocumentQuality, ValidationResult, validate};
