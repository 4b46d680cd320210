//! Tavily web search, the primary search tier.

use crate::http_client;
use async_trait::async_trait;
use scholar_core::config::SearchConfig;
use scholar_core::error::SearchError;
use scholar_core::research::{Document, SearchProvider};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const PROVIDER: &str = "tavily";
const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const MAX_ERROR_BODY: usize = 500;

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

/// Search through the Tavily `/search` endpoint.
///
/// A missing API key is reported per request as
/// [`SearchError::MissingApiKey`], so the tier is skipped rather than
/// failing construction.
pub struct TavilySearch {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl TavilySearch {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let api_key = std::env::var(&config.tavily_api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::with_key(config, api_key)
    }

    pub fn with_key(config: &SearchConfig, api_key: Option<String>) -> Result<Self, SearchError> {
        Ok(Self {
            client: http_client(PROVIDER, Duration::from_secs(config.timeout_secs))?,
            base_url: config
                .tavily_base_url
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            api_key_env: config.tavily_api_key_env.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Document>, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::MissingApiKey {
                provider: PROVIDER.into(),
                env_var: self.api_key_env.clone(),
            })?;

        debug!(query, max_results, "Sending Tavily search");
        let response = self
            .client
            .post(self.endpoint())
            .json(&SearchRequest {
                api_key,
                query,
                max_results,
            })
            .send()
            .await
            .map_err(|e| SearchError::Request {
                provider: PROVIDER.into(),
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Http {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| SearchError::Parse {
            provider: PROVIDER.into(),
            message: e.to_string(),
        })?;
        parse_results(&body, query)
    }
}

/// Convert a Tavily response body into documents.
pub fn parse_results(body: &serde_json::Value, query: &str) -> Result<Vec<Document>, SearchError> {
    let results = body
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| SearchError::Parse {
            provider: PROVIDER.into(),
            message: "response has no 'results' array".into(),
        })?;

    Ok(results
        .iter()
        .map(|hit| {
            let field = |name: &str| hit.get(name).and_then(|v| v.as_str());
            Document::from_search_hit(
                query,
                field("title"),
                field("url").unwrap_or_default(),
                field("content").unwrap_or_default(),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_results() {
        let body = json!({
            "query": "rust",
            "results": [
                {
                    "title": "The Rust Book",
                    "url": "https://doc.rust-lang.org/book/",
                    "content": "Rust is a systems programming language."
                },
                { "url": "", "content": "untitled hit" }
            ]
        });
        let docs = parse_results(&body, "rust").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title, "The Rust Book");
        assert_eq!(docs[0].source_domain, "doc.rust-lang.org");
        assert_eq!(docs[0].raw_content, "Rust is a systems programming language.");
        assert_eq!(docs[1].title, "rust");
        assert_eq!(docs[1].source_domain, "unknown");
        assert_ne!(docs[0].id, docs[1].id);
    }

    #[test]
    fn test_parse_results_empty_and_malformed() {
        assert!(parse_results(&json!({"results": []}), "q").unwrap().is_empty());
        let err = parse_results(&json!({"detail": "bad key"}), "q").unwrap_err();
        assert!(matches!(err, SearchError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let config = SearchConfig {
            tavily_base_url: Some("http://127.0.0.1:9".into()),
            ..Default::default()
        };
        let search = TavilySearch::with_key(&config, None).unwrap();
        let err = search.search("rust", 3).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::MissingApiKey { ref env_var, .. } if env_var == "TAVILY_API_KEY"
        ));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = SearchConfig {
            tavily_base_url: Some("http://localhost:8080/".into()),
            ..Default::default()
        };
        let search = TavilySearch::with_key(&config, Some("k".into())).unwrap();
        assert_eq!(search.endpoint(), "http://localhost:8080/search");
        assert_eq!(search.name(), "tavily");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(SearchRequest {
            api_key: "k",
            query: "q",
            max_results: 5,
        })
        .unwrap();
        assert_eq!(body, json!({"api_key": "k", "query": "q", "max_results": 5}));
    }
}
