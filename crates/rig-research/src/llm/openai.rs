//! OpenAI LLM Provider implementation via Rig
//!
//! Provides OpenAI API access through rig-core's OpenAI client.

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai::Client;

use super::config::LLMConfig;
use super::message::{extract_prompt, extract_system_preamble, Message};
use super::provider::{LLMProvider, LLMResponse};
use crate::error::ResearchError;

/// OpenAI LLM Provider
///
/// # Example
///
/// ```rust,ignore
/// use rig_research::llm::OpenAIProvider;
///
/// // Reads OPENAI_API_KEY
/// let provider = OpenAIProvider::from_env_with_model("gpt-4.1");
/// ```
pub struct OpenAIProvider {
    client: Client,
    default_config: LLMConfig,
}

impl OpenAIProvider {
    /// Create a provider with API key from OPENAI_API_KEY environment variable
    pub fn from_env() -> Self {
        Self::from_env_with_model("gpt-4.1")
    }

    /// Create from environment with specific model
    pub fn from_env_with_model(model: impl Into<String>) -> Self {
        Self::with_config(LLMConfig::new(model))
    }

    /// Create from environment with a full default configuration
    pub fn with_config(config: LLMConfig) -> Self {
        Self {
            client: Client::from_env(),
            default_config: config,
        }
    }

    /// Get effective configuration, preferring runtime config over defaults
    fn effective_config<'a>(&'a self, runtime: Option<&'a LLMConfig>) -> &'a LLMConfig {
        runtime.unwrap_or(&self.default_config)
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete(
        &self,
        messages: &[Message],
        config: Option<&LLMConfig>,
    ) -> Result<LLMResponse, ResearchError> {
        let config = self.effective_config(config);

        let mut agent_builder = self.client.agent(&config.model);

        if let Some(preamble) = extract_system_preamble(messages) {
            agent_builder = agent_builder.preamble(&preamble);
        }
        if let Some(temp) = config.temperature {
            agent_builder = agent_builder.temperature(temp);
        }
        if let Some(max_tokens) = config.max_tokens {
            agent_builder = agent_builder.max_tokens(max_tokens);
        }

        let agent = agent_builder.build();
        let prompt = extract_prompt(messages);

        let response = agent
            .prompt(prompt.as_str())
            .await
            .map_err(|e| ResearchError::Llm(format!("OpenAI completion failed: {}", e)))?;

        Ok(LLMResponse::new(response))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_config.model
    }
}
