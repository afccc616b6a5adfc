//! LLM Provider trait definition
//!
//! Defines the capability the research nodes need from a language model:
//! free-text completion, and completion constrained to a declared shape.
//! Implementations bridge to specific providers via Rig's agent builder.

use async_trait::async_trait;

use super::config::LLMConfig;
use super::message::Message;
use super::structured::{extract_json, StructuredSchema};
use crate::error::ResearchError;

/// LLM completion response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LLMResponse {
    /// The assistant's reply text
    pub content: String,
}

impl LLMResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Core LLM Provider trait
///
/// Provider-agnostic interface used by every research node. Swapping the
/// model vendor never touches node logic.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use rig_research::llm::{LLMConfig, LLMProvider, LLMResponse, Message};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl LLMProvider for MyProvider {
///     async fn complete(
///         &self,
///         messages: &[Message],
///         config: Option<&LLMConfig>,
///     ) -> Result<LLMResponse, ResearchError> {
///         // Implementation here
///     }
///
///     fn name(&self) -> &str { "my-provider" }
///     fn default_model(&self) -> &str { "my-model" }
/// }
/// ```
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a free-text completion
    async fn complete(
        &self,
        messages: &[Message],
        config: Option<&LLMConfig>,
    ) -> Result<LLMResponse, ResearchError>;

    /// Generate a completion constrained to `schema`, returned as raw JSON
    ///
    /// Default implementation asks for the shape in an extra system message and
    /// pulls the JSON object out of the reply. Override for providers with
    /// native structured output.
    async fn complete_structured(
        &self,
        messages: &[Message],
        schema: &StructuredSchema,
        config: Option<&LLMConfig>,
    ) -> Result<serde_json::Value, ResearchError> {
        let mut prompt = messages.to_vec();
        prompt.push(Message::system(schema.instruction()));

        let response = self.complete(&prompt, config).await?;
        extract_json(&response.content)
    }

    /// Provider name for logging/debugging
    fn name(&self) -> &str;

    /// Default model identifier for this provider
    fn default_model(&self) -> &str;
}
