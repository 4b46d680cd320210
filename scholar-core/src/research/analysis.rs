//! Lexical analysis: keyword and theme extraction by word frequency.
//!
//! Frequency ties are broken by first occurrence in the concatenated,
//! lower-cased document text.

use super::document::Document;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::info;

/// Function words never reported as themes.
pub const THEME_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "have", "has", "been", "are", "were",
    "their",
];

pub const MAX_KEYWORDS: usize = 10;
pub const MAX_THEMES: usize = 5;
const THEME_CANDIDATES: usize = 8;

/// Summary placed on the result when there was nothing to analyze.
pub const NO_CONTENT_SUMMARY: &str = "No content to analyze";

static KEYWORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{4,}\b").expect("keyword pattern is valid"));
static THEME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{5,}\b").expect("theme pattern is valid"));

/// Coarse content verdict, derived from the number of non-empty documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentQuality {
    Good,
    Limited,
}

impl std::fmt::Display for ContentQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentQuality::Good => write!(f, "good"),
            ContentQuality::Limited => write!(f, "limited"),
        }
    }
}

/// Output of the lexical analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Frequency-ranked words of four or more letters.
    pub keywords: Vec<String>,
    /// Title-cased recurring words, excluding topic and stop words.
    pub themes: Vec<String>,
    pub num_sources: usize,
    /// `None` only for the no-content variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_quality: Option<ContentQuality>,
    /// Set only for the no-content variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AnalysisResult {
    /// The result produced when no document carried any text.
    pub fn no_content() -> Self {
        Self {
            keywords: Vec::new(),
            themes: Vec::new(),
            num_sources: 0,
            content_quality: None,
            summary: Some(NO_CONTENT_SUMMARY.to_string()),
        }
    }

    pub fn is_no_content(&self) -> bool {
        self.content_quality.is_none()
    }
}

/// Analyze the raw content of `documents` in the context of `topic`.
///
/// `num_sources` counts every document, including those with empty content.
pub fn analyze_documents(documents: &[Document], topic: &str) -> AnalysisResult {
    let texts: Vec<&str> = documents
        .iter()
        .map(|d| d.raw_content.as_str())
        .filter(|t| !t.is_empty())
        .collect();
    analyze_texts(&texts, topic, documents.len())
}

/// Analyze a collection of document texts.
pub fn analyze_texts(texts: &[&str], topic: &str, num_sources: usize) -> AnalysisResult {
    let non_empty = texts.iter().filter(|t| !t.is_empty()).count();
    if non_empty == 0 {
        return AnalysisResult::no_content();
    }

    let full_text = texts.join(" ").to_lowercase();
    let themes = extract_themes(&full_text, topic);
    let keywords: Vec<String> =
        rank_by_frequency(KEYWORD_TOKEN.find_iter(&full_text).map(|m| m.as_str()))
            .into_iter()
            .take(MAX_KEYWORDS)
            .map(|(word, _)| word.to_string())
            .collect();

    info!(
        themes = themes.len(),
        keywords = keywords.len(),
        sources = num_sources,
        "Lexical analysis complete"
    );

    AnalysisResult {
        keywords,
        themes,
        num_sources,
        content_quality: Some(if non_empty > 3 {
            ContentQuality::Good
        } else {
            ContentQuality::Limited
        }),
        summary: None,
    }
}

/// Extract up to [`MAX_THEMES`] themes from already lower-cased text.
pub fn extract_themes(lowercased: &str, topic: &str) -> Vec<String> {
    let topic_lower = topic.to_lowercase();
    let excluded: HashSet<&str> = THEME_STOP_WORDS
        .iter()
        .copied()
        .chain(topic_lower.split_whitespace())
        .collect();

    let candidates = THEME_TOKEN
        .find_iter(lowercased)
        .map(|m| m.as_str())
        .filter(|w| !excluded.contains(w));

    rank_by_frequency(candidates)
        .into_iter()
        .take(THEME_CANDIDATES)
        .filter(|(_, count)| *count > 1)
        .map(|(word, _)| title_case(word))
        .take(MAX_THEMES)
        .collect()
}

/// Count tokens and sort by descending frequency; ties keep first-seen order.
fn rank_by_frequency<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for token in tokens {
        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    let mut ranked: Vec<(&str, usize)> = order.into_iter().map(|w| (w, counts[w])).collect();
    // sort_by is stable, so equal counts stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_collection_is_no_content() {
        let result = analyze_texts(&[], "anything", 0);
        assert!(result.keywords.is_empty());
        assert!(result.themes.is_empty());
        assert!(result.is_no_content());
        assert_eq!(result.summary.as_deref(), Some(NO_CONTENT_SUMMARY));
    }

    #[test]
    fn test_documents_without_content_are_no_content() {
        let mut doc = Document::from_search_hit("q", None, "", "");
        doc.raw_content.clear();
        let result = analyze_documents(&[doc.clone(), doc], "q");
        assert!(result.is_no_content());
        assert_eq!(result.num_sources, 0);
    }

    #[test]
    fn test_keyword_ranking_ties_first_seen() {
        let result = analyze_texts(&["beta alpha beta gamma alpha delta"], "", 1);
        assert_eq!(result.keywords, vec!["beta", "alpha", "gamma", "delta"]);
    }

    #[test]
    fn test_keywords_skip_short_words_and_cap_at_ten() {
        let text = "one two three four five six seven eight nine eleven twelve thirteen \
                    fourteen fifteen sixteen";
        let result = analyze_texts(&[text], "", 1);
        assert!(!result.keywords.contains(&"one".to_string()));
        assert_eq!(result.keywords.len(), MAX_KEYWORDS);
        assert_eq!(result.keywords[0], "three");
    }

    #[test]
    fn test_themes_exclude_topic_and_stop_words() {
        let text = "Machine learning models learning models machine networks networks \
                    their their their";
        let result = analyze_texts(&[text], "Machine Learning", 1);
        assert_eq!(result.themes, vec!["Models", "Networks"]);
    }

    #[test]
    fn test_themes_require_repeats() {
        let result = analyze_texts(&["unique words appear exactly once here"], "", 1);
        assert!(result.themes.is_empty());
    }

    #[test]
    fn test_themes_capped_at_five() {
        let text = "aaaaa aaaaa bbbbb bbbbb ccccc ccccc ddddd ddddd eeeee eeeee fffff fffff";
        let result = analyze_texts(&[text], "", 1);
        assert_eq!(
            result.themes,
            vec!["Aaaaa", "Bbbbb", "Ccccc", "Ddddd", "Eeeee"]
        );
    }

    #[test]
    fn test_content_quality_threshold() {
        let three = analyze_texts(&["alpha"; 3], "", 3);
        assert_eq!(three.content_quality, Some(ContentQuality::Limited));
        let four = analyze_texts(&["alpha"; 4], "", 4);
        assert_eq!(four.content_quality, Some(ContentQuality::Good));
    }

    #[test]
    fn test_num_sources_counts_empty_documents() {
        let full = Document::from_search_hit("q", None, "", "content here");
        let empty = Document::from_search_hit("q", None, "", "");
        let result = analyze_documents(&[full, empty], "q");
        assert_eq!(result.num_sources, 2);
        assert_eq!(result.content_quality, Some(ContentQuality::Limited));
    }

    #[test]
    fn test_words_glued_to_digits_are_ignored() {
        let result = analyze_texts(&["model2 model2 tokens tokens"], "", 1);
        assert_eq!(result.keywords, vec!["tokens"]);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("health"), "Health");
        assert_eq!(title_case(""), "");
    }
}
