//! # Configuration Module
//!
//! Loads the research assistant's settings from the environment (and a local
//! `.env` file). Command-line flags are applied on top in `main.rs`.

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;

use rig_research::llm::DEFAULT_OLLAMA_HOST;
use rig_research::research::{DEFAULT_MAX_RESULTS, DEFAULT_RECURSION_LIMIT};
use rig_research::search::SearchDepth;

// =============================================================================
// LLM PROVIDER SELECTION
// =============================================================================
/// Which model backend drives the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// OpenAI API (needs OPENAI_API_KEY)
    #[default]
    OpenAI,
    /// Local Ollama server
    Ollama,
}

impl Provider {
    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4.1",
            Provider::Ollama => "llama3.2",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "ollama" => Ok(Provider::Ollama),
            other => Err(format!(
                "unknown LLM provider '{}' (expected 'openai' or 'ollama')",
                other
            )),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAI => f.write_str("openai"),
            Provider::Ollama => f.write_str("ollama"),
        }
    }
}

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Main configuration for the research assistant.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,

    /// Explicit model name; `None` means the provider's default
    pub model: Option<String>,

    /// Ollama server URL (default: http://localhost:11434)
    pub ollama_host: String,

    /// Temperature for LLM responses (0.0 = deterministic)
    pub temperature: f64,

    /// Search results kept per query
    pub max_search_results: usize,

    /// Tavily search depth (basic or advanced)
    pub search_depth: SearchDepth,

    /// Revisions allowed before the editor's "no" becomes a rejection
    pub max_revisions: usize,

    /// Node executions allowed per run
    pub recursion_limit: usize,

    pub tavily_api_key: Option<String>,

    /// Top-level Drive folder to publish into; no publication when unset
    pub drive_folder: Option<String>,

    /// OAuth access token for the Drive API
    pub drive_access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),

            // Reports should be reproducible
            temperature: 0.0,

            max_search_results: DEFAULT_MAX_RESULTS,
            search_depth: SearchDepth::default(),
            max_revisions: 2,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            tavily_api_key: None,
            drive_folder: None,
            drive_access_token: None,
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Example
    /// ```ignore
    /// let config = Config::from_env()?;
    /// println!("Using model: {}", config.effective_model());
    /// ```
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let mut config = Config::default();

        if let Ok(val) = env::var("LLM_PROVIDER") {
            config.provider = val
                .parse()
                .map_err(anyhow::Error::msg)
                .context("LLM_PROVIDER must be 'openai' or 'ollama'")?;
        }

        if let Ok(val) = env::var("LLM_MODEL") {
            config.model = Some(val);
        }

        if let Ok(val) = env::var("OLLAMA_API_BASE_URL") {
            config.ollama_host = val;
        }

        if let Ok(val) = env::var("TEMPERATURE") {
            config.temperature = val
                .parse()
                .context("TEMPERATURE must be a valid floating-point number (e.g., 0.2)")?;
        }

        if let Ok(val) = env::var("MAX_SEARCH_RESULTS") {
            config.max_search_results = val
                .parse()
                .context("MAX_SEARCH_RESULTS must be a valid positive integer")?;
        }

        if let Ok(val) = env::var("TAVILY_SEARCH_DEPTH") {
            config.search_depth = val
                .parse()
                .map_err(anyhow::Error::msg)
                .context("TAVILY_SEARCH_DEPTH must be 'basic' or 'advanced'")?;
        }

        if let Ok(val) = env::var("MAX_REVISIONS") {
            config.max_revisions = val
                .parse()
                .context("MAX_REVISIONS must be a valid non-negative integer")?;
        }

        if let Ok(val) = env::var("RECURSION_LIMIT") {
            config.recursion_limit = val
                .parse()
                .context("RECURSION_LIMIT must be a valid positive integer")?;
        }

        config.tavily_api_key = non_empty_var("TAVILY_API_KEY");
        config.drive_folder = non_empty_var("DRIVE_FOLDER");
        config.drive_access_token = non_empty_var("GOOGLE_DRIVE_ACCESS_TOKEN");

        Ok(config)
    }

    /// The configured model, or the provider's default
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!(
                "Temperature must be between 0.0 and 2.0, got: {}",
                self.temperature
            );
        }

        if self.max_search_results == 0 {
            anyhow::bail!("MAX_SEARCH_RESULTS must be at least 1");
        }

        if self.effective_model().trim().is_empty() {
            anyhow::bail!("LLM_MODEL cannot be empty");
        }

        if self.recursion_limit == 0 {
            anyhow::bail!("RECURSION_LIMIT must be at least 1");
        }

        if self.drive_folder.is_some() && self.drive_access_token.is_none() {
            anyhow::bail!("GOOGLE_DRIVE_ACCESS_TOKEN is required when a Drive folder is set");
        }

        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
