//! Ollama LLM Provider implementation via Rig
//!
//! Local inference through rig-core's Ollama client.

use async_trait::async_trait;
use rig::client::{CompletionClient, Nothing};
use rig::completion::Prompt;
use rig::providers::ollama;
use tracing::debug;

use super::config::LLMConfig;
use super::message::{extract_prompt, extract_system_preamble, Message};
use super::provider::{LLMProvider, LLMResponse};
use crate::error::ResearchError;

/// Default Ollama server
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Ollama LLM Provider
pub struct OllamaProvider {
    client: ollama::Client,
    host: String,
    default_config: LLMConfig,
}

impl OllamaProvider {
    /// Connect to the Ollama server at `host`
    pub fn new(host: impl Into<String>, config: LLMConfig) -> Result<Self, ResearchError> {
        let host = host.into();
        let client = ollama::Client::builder()
            .api_key(Nothing)
            .base_url(&host)
            .build()
            .map_err(|e| ResearchError::Llm(format!("Invalid Ollama host {}: {}", host, e)))?;

        debug!(host = %host, model = %config.model, "Connected to Ollama");

        Ok(Self {
            client,
            host,
            default_config: config,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: &[Message],
        config: Option<&LLMConfig>,
    ) -> Result<LLMResponse, ResearchError> {
        let config = config.unwrap_or(&self.default_config);

        let mut agent_builder = self.client.agent(&config.model);

        if let Some(preamble) = extract_system_preamble(messages) {
            agent_builder = agent_builder.preamble(&preamble);
        }
        if let Some(temp) = config.temperature {
            agent_builder = agent_builder.temperature(temp);
        }

        let agent = agent_builder.build();
        let prompt = extract_prompt(messages);

        let response = agent
            .prompt(prompt.as_str())
            .await
            .map_err(|e| ResearchError::Llm(format!("Ollama completion failed: {}", e)))?;

        Ok(LLMResponse::new(response))
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn default_model(&self) -> &str {
        &self.default_config.model
    }
}
