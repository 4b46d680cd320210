//! DuckDuckGo instant answers, the secondary search tier.
//!
//! Needs no API key. Coverage is thin: the API returns an abstract for
//! well-known subjects plus related topics, not a ranked result list.

use crate::http_client;
use async_trait::async_trait;
use scholar_core::config::SearchConfig;
use scholar_core::error::SearchError;
use scholar_core::research::{Document, SearchProvider};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const PROVIDER: &str = "duckduckgo";
const DEFAULT_BASE_URL: &str = "https://api.duckduckgo.com";

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(config: &SearchConfig, base_url: &str) -> Result<Self, SearchError> {
        Ok(Self {
            client: http_client(PROVIDER, Duration::from_secs(config.timeout_secs))?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn query_url(&self, query: &str) -> String {
        format!(
            "{}/?q={}&format=json&no_html=1&skip_disambig=1",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Document>, SearchError> {
        debug!(query, "Querying DuckDuckGo instant answers");
        let response = self
            .client
            .get(self.query_url(query))
            .send()
            .await
            .map_err(|e| SearchError::Request {
                provider: PROVIDER.into(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                body: String::new(),
            });
        }

        // The API answers with a JavaScript content type, so parse the text.
        let text = response.text().await.map_err(|e| SearchError::Request {
            provider: PROVIDER.into(),
            message: e.to_string(),
        })?;
        let body: Value = serde_json::from_str(&text).map_err(|e| SearchError::Parse {
            provider: PROVIDER.into(),
            message: e.to_string(),
        })?;
        Ok(parse_instant_answers(&body, query, max_results))
    }
}

/// Collect the abstract, then related topics, then direct results.
pub fn parse_instant_answers(body: &Value, query: &str, max_results: usize) -> Vec<Document> {
    let mut documents = Vec::new();
    let str_field = |v: &Value, name: &str| -> Option<String> {
        v.get(name)
            .and_then(|f| f.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(abstract_text) = str_field(body, "AbstractText") {
        let url = str_field(body, "AbstractURL").unwrap_or_default();
        let heading = str_field(body, "Heading");
        documents.push(Document::from_search_hit(
            query,
            heading.as_deref(),
            &url,
            &abstract_text,
        ));
    }

    let related = body
        .get("RelatedTopics")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .flat_map(|topic| match topic.get("Topics").and_then(Value::as_array) {
            // Grouped topics nest one level deep.
            Some(group) => group.iter().collect::<Vec<_>>(),
            None => vec![topic],
        });
    let results = body
        .get("Results")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();

    for entry in related.chain(results) {
        if documents.len() >= max_results {
            break;
        }
        if let Some(text) = str_field(entry, "Text") {
            let url = str_field(entry, "FirstURL").unwrap_or_default();
            let title = title_from_url(&url);
            documents.push(Document::from_search_hit(query, title.as_deref(), &url, &text));
        }
    }

    documents.truncate(max_results);
    documents
}

/// `https://duckduckgo.com/Rust_(programming_language)` → `Rust (programming language)`.
fn title_from_url(url: &str) -> Option<String> {
    let segment = url.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() || segment.contains('.') {
        return None;
    }
    let decoded = urlencoding::decode(segment).ok()?;
    Some(decoded.replace('_', " "))
}
