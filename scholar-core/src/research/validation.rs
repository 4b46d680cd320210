//! Sufficiency validation: threshold checks over source and theme counts.

use super::analysis::AnalysisResult;
use super::document::Document;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const RECOMMEND_EXPAND_SEARCH: &str = "Consider expanding search with more specific terms";
pub const RECOMMEND_DEEPER_ANALYSIS: &str = "Analysis may need deeper processing";
pub const RECOMMEND_SOURCE_DIVERSITY: &str = "Excellent source diversity";

/// Quality verdict over the retrieved document set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentQuality {
    Good,
    Poor,
}

impl std::fmt::Display for DocumentQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentQuality::Good => write!(f, "good"),
            DocumentQuality::Poor => write!(f, "poor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub has_sufficient_sources: bool,
    pub has_key_themes: bool,
    pub document_quality: DocumentQuality,
    pub source_count: usize,
    pub theme_count: usize,
    pub recommendations: Vec<String>,
}

/// Validate the analysis against the documents it was computed from.
pub fn validate(analysis: &AnalysisResult, documents: &[Document]) -> ValidationResult {
    let result = validate_counts(documents.len(), analysis.themes.len());
    info!(
        sources = result.source_count,
        themes = result.theme_count,
        quality = %result.document_quality,
        "Validation complete"
    );
    result
}

/// Pure threshold rules.
///
/// `has_sufficient_sources` uses `>= 3` while `document_quality` uses `> 2`.
/// Both comparisons are kept as written; over integers they always agree.
pub fn validate_counts(source_count: usize, theme_count: usize) -> ValidationResult {
    let mut recommendations = Vec::new();
    if source_count < 2 {
        recommendations.push(RECOMMEND_EXPAND_SEARCH.to_string());
    }
    if theme_count == 0 {
        recommendations.push(RECOMMEND_DEEPER_ANALYSIS.to_string());
    }
    if source_count >= 5 {
        recommendations.push(RECOMMEND_SOURCE_DIVERSITY.to_string());
    }

    ValidationResult {
        has_sufficient_sources: source_count >= 3,
        has_key_themes: theme_count > 0,
        document_quality: if source_count > 2 {
            DocumentQuality::Good
        } else {
            DocumentQuality::Poor
        },
        source_count,
        theme_count,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::analysis::analyze_texts;

    #[test]
    fn test_sufficiency_boundary() {
        let two = validate_counts(2, 1);
        assert!(!two.has_sufficient_sources);
        assert_eq!(two.document_quality, DocumentQuality::Poor);

        let three = validate_counts(3, 1);
        assert!(three.has_sufficient_sources);
        assert_eq!(three.document_quality, DocumentQuality::Good);
    }

    #[test]
    fn test_thresholds_coincide_over_small_counts() {
        for n in 0..64 {
            let result = validate_counts(n, 0);
            assert_eq!(
                result.has_sufficient_sources,
                result.document_quality == DocumentQuality::Good,
                "thresholds diverged at {n}"
            );
        }
    }

    #[test]
    fn test_recommendations_order_for_single_source_no_themes() {
        let result = validate_counts(1, 0);
        assert_eq!(
            result.recommendations,
            vec![RECOMMEND_EXPAND_SEARCH, RECOMMEND_DEEPER_ANALYSIS]
        );
    }

    #[test]
    fn test_no_recommendations_in_middle_band() {
        assert!(validate_counts(3, 2).recommendations.is_empty());
        assert!(validate_counts(4, 1).recommendations.is_empty());
    }

    #[test]
    fn test_diversity_recommendation() {
        let result = validate_counts(5, 0);
        assert_eq!(
            result.recommendations,
            vec![RECOMMEND_DEEPER_ANALYSIS, RECOMMEND_SOURCE_DIVERSITY]
        );
        assert!(!result.has_key_themes);
    }

    #[test]
    fn test_validate_uses_document_and_theme_counts() {
        let docs: Vec<Document> = (0..4)
            .map(|_| Document::from_search_hit("q", None, "", "rust rust tokio tokio"))
            .collect();
        let analysis = analyze_texts(&["rust rust tokio tokio"], "", 4);
        let result = validate(&analysis, &docs);
        assert_eq!(result.source_count, 4);
        assert_eq!(result.theme_count, analysis.themes.len());
        assert!(result.has_key_themes);
    }

    #[test]
    fn test_quality_serializes_lowercase() {
        let json = serde_json::to_string(&validate_counts(0, 0)).unwrap();
        assert!(json.contains("\"document_quality\":\"poor\""));
    }
}
