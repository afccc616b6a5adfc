//! Tavily Search - web search for the research nodes
//!
//! Calls the Tavily Search API and returns hits in rank order. Failures are
//! typed ([`SearchError`]) and never retried: a failed search fails the node.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use super::{SearchHit, SearchProvider, SearchResponse};
use crate::error::{ResearchError, SearchError};

/// Default timeout for Tavily API requests
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tavily accepts at most this many results per request
const MAX_RESULTS_LIMIT: usize = 20;

/// Production API endpoint
pub const DEFAULT_TAVILY_URL: &str = "https://api.tavily.com";

/// Search depth for Tavily API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// Fast search with basic results
    #[default]
    Basic,
    /// More thorough search with detailed results
    Advanced,
}

impl FromStr for SearchDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(SearchDepth::Basic),
            "advanced" => Ok(SearchDepth::Advanced),
            other => Err(format!(
                "unknown search depth '{}' (expected 'basic' or 'advanced')",
                other
            )),
        }
    }
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchDepth::Basic => f.write_str("basic"),
            SearchDepth::Advanced => f.write_str("advanced"),
        }
    }
}

/// Tavily search client
///
/// # Example
/// ```ignore
/// let tavily = TavilySearch::from_env()?;
/// let response = tavily.search("Rust async runtimes", 5).await?;
/// ```
pub struct TavilySearch {
    api_key: String,
    client: Client,
    base_url: String,
    timeout: Duration,
    search_depth: SearchDepth,
}

impl TavilySearch {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: DEFAULT_TAVILY_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            search_depth: SearchDepth::default(),
        }
    }

    /// Create from environment variable TAVILY_API_KEY
    pub fn from_env() -> Result<Self, ResearchError> {
        let api_key = std::env::var("TAVILY_API_KEY").map_err(|_| {
            ResearchError::Config("TAVILY_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Point at a different endpoint (used against mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_search_depth(mut self, depth: SearchDepth) -> Self {
        self.search_depth = depth;
        self
    }

    async fn execute(&self, request: &TavilyRequest<'_>) -> Result<TavilyResponse, SearchError> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else if e.is_connect() {
                    SearchError::Connection(e.to_string())
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| SearchError::ParseError(e.to_string()));
        }

        let error_text = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(SearchError::Unauthorized),
            429 => Err(SearchError::RateLimited),
            400 => Err(SearchError::BadRequest(error_text)),
            500..=599 => Err(SearchError::ServerError(status.as_u16(), error_text)),
            _ => Err(SearchError::HttpError(status.as_u16(), error_text)),
        }
    }
}

/// Request body for Tavily API
#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: SearchDepth,
    include_answer: bool,
}

/// Response from Tavily API
#[derive(Debug, Deserialize)]
struct TavilyResponse {
    answer: Option<String>,
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
    #[serde(default)]
    score: f64,
}

impl From<TavilyResult> for SearchHit {
    fn from(r: TavilyResult) -> Self {
        SearchHit {
            title: r.title,
            url: r.url,
            content: r.content,
            score: r.score,
        }
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, SearchError> {
        let request = TavilyRequest {
            query,
            max_results: max_results.clamp(1, MAX_RESULTS_LIMIT),
            search_depth: self.search_depth,
            include_answer: false,
        };

        debug!(query = %query, max_results = request.max_results, "Tavily search");

        let response = self.execute(&request).await?;

        Ok(SearchResponse {
            query: query.to_string(),
            answer: response.answer,
            results: response
                .results
                .into_iter()
                .take(request.max_results)
                .map(SearchHit::from)
                .collect(),
        })
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
