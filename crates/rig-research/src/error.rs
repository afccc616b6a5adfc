// src/error.rs
//! Error types
//!
//! Three families, one per collaborator:
//! - [`StorageError`]: the remote file store behind the storage gateway
//! - [`SearchError`]: the web search provider
//! - [`ResearchError`]: workflow execution (model calls, search, runner limits)

use thiserror::Error;

/// Storage gateway / Drive provider errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// The configured top-level folder does not exist. Configuration error, never retried.
    #[error("No folder called {0} is found")]
    FolderNotFound(String),

    #[error("HTTP error ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Response is missing field: {0}")]
    MissingField(&'static str),
}

impl StorageError {
    /// Whether this error came from the provider round-trip (as opposed to configuration or local IO)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StorageError::Http { .. } | StorageError::Transport(_) | StorageError::Parse(_)
        )
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

/// Typed errors for the search provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check API key")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Workflow-level error
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Structured output error: {0}")]
    StructuredOutput(String),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Recursion limit of {0} node executions reached")]
    RecursionLimit(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
