//! LLM configuration types
//!
//! Per-provider model settings.

use serde::{Deserialize, Serialize};

/// LLM Provider configuration
///
/// Set at provider construction time; nodes may pass an override per call.
///
/// # Example
///
/// ```
/// use rig_research::llm::LLMConfig;
///
/// let config = LLMConfig::new("gpt-4.1").with_temperature(0.0);
///
/// assert_eq!(config.model, "gpt-4.1");
/// assert_eq!(config.temperature, Some(0.0));
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Model identifier (e.g., "gpt-4.1", "llama3.2")
    pub model: String,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: Option<f64>,
    /// Maximum tokens to generate in the response
    pub max_tokens: Option<u64>,
}

impl LLMConfig {
    /// Create a new configuration with the specified model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set the maximum tokens to generate
    pub fn with_max_tokens(mut self, tokens: u64) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}
