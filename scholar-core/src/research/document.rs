//! Retrieved documents and the search provider seam.

use crate::error::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Maximum length of a document snippet, in characters.
pub const SNIPPET_CHARS: usize = 200;

/// Identifier of the synthetic document used when every search tier fails.
pub const PLACEHOLDER_ID: &str = "sim_1";

/// A web document retrieved by the search stage.
///
/// Immutable once created; the analysis, summarize and format stages only
/// read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique within one run.
    pub id: String,
    pub title: String,
    pub url: String,
    /// At most [`SNIPPET_CHARS`] characters.
    pub snippet: String,
    pub raw_content: String,
    pub source_domain: String,
}

impl Document {
    /// Normalise one search hit into a document.
    ///
    /// A missing or blank title falls back to the query; the snippet is the
    /// leading [`SNIPPET_CHARS`] characters of `content`.
    pub fn from_search_hit(query: &str, title: Option<&str>, url: &str, content: &str) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(query);
        Self {
            id: short_id(),
            title: title.to_string(),
            url: url.to_string(),
            snippet: truncate_chars(content, SNIPPET_CHARS).to_string(),
            raw_content: content.to_string(),
            source_domain: source_domain(url),
        }
    }

    /// The synthetic document returned when no search tier produced results.
    pub fn placeholder(query: &str) -> Self {
        Self {
            id: PLACEHOLDER_ID.to_string(),
            title: format!("Research on {query}"),
            url: "https://example.com/simulated".to_string(),
            snippet: format!(
                "Simulated content for {query}. Please check your Tavily API key."
            ),
            raw_content: format!(
                "This is simulated content for the topic: {query}. In a real deployment, \
                 this would contain actual research content from web sources."
            ),
            source_domain: "simulated.com".to_string(),
        }
    }

    /// Whether this is the synthetic fallback document.
    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_ID
    }

    /// Text handed to the LLM: the full content, or the snippet when empty.
    pub fn prompt_text(&self) -> &str {
        if self.raw_content.trim().is_empty() {
            &self.snippet
        } else {
            &self.raw_content
        }
    }
}

/// Host part of a URL: the third `/`-separated segment, `"unknown"` if absent.
pub fn source_domain(url: &str) -> String {
    url.split('/')
        .nth(2)
        .filter(|host| !host.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Longest prefix of `text` with at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// A web search backend. One provider is one fallback tier.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Search for `query`, returning at most `max_results` documents.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Document>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_search_hit() {
        let content = "x".repeat(450);
        let doc = Document::from_search_hit(
            "rust async",
            Some("Async in Rust"),
            "https://blog.rust-lang.org/2019/11/07/Async-await-stable.html",
            &content,
        );
        assert_eq!(doc.id.len(), 8);
        assert_eq!(doc.title, "Async in Rust");
        assert_eq!(doc.snippet.len(), SNIPPET_CHARS);
        assert_eq!(doc.raw_content.len(), 450);
        assert_eq!(doc.source_domain, "blog.rust-lang.org");
    }

    #[test]
    fn test_from_search_hit_defaults() {
        let doc = Document::from_search_hit("topic", Some("  "), "", "short");
        assert_eq!(doc.title, "topic");
        assert_eq!(doc.source_domain, "unknown");
        assert_eq!(doc.snippet, "short");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Document::from_search_hit("q", None, "", "");
        let b = Document::from_search_hit("q", None, "", "");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_source_domain_without_scheme() {
        assert_eq!(source_domain("example.com/path"), "unknown");
        assert_eq!(source_domain("https://example.com"), "example.com");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_placeholder() {
        let doc = Document::placeholder("Quantum Computing");
        assert!(doc.is_placeholder());
        assert_eq!(doc.title, "Research on Quantum Computing");
        assert_eq!(doc.source_domain, "simulated.com");
        assert!(doc.raw_content.contains("Quantum Computing"));
    }

    #[test]
    fn test_prompt_text_falls_back_to_snippet() {
        let mut doc = Document::from_search_hit("q", None, "", "body");
        assert_eq!(doc.prompt_text(), "body");
        doc.raw_content.clear();
        doc.snippet = "snip".into();
        assert_eq!(doc.prompt_text(), "snip");
    }
}
