//! Web search providers
//!
//! The research nodes only need "query in, ranked text snippets out". The
//! [`SearchProvider`] trait is that contract; [`TavilySearch`] is the HTTP
//! implementation.

mod tavily;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

pub use tavily::{SearchDepth, TavilySearch, DEFAULT_TAVILY_URL};

/// A single ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Extracted text body; this is what the research nodes accumulate
    pub content: String,
    /// Relevance score (0-1)
    #[serde(default)]
    pub score: f64,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            score: 0.0,
        }
    }
}

/// Results for one query, in provider rank order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    /// Provider-generated answer, when requested
    #[serde(default)]
    pub answer: Option<String>,
    pub results: Vec<SearchHit>,
}

/// Web search capability used by the query-expansion nodes
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query`, returning at most `max_results` hits
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, SearchError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
