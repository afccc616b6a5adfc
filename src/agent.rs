//! # Agent Module
//!
//! Wires configuration into the research workflow:
//! - picks the LLM backend (OpenAI or Ollama via Rig)
//! - builds the Tavily searcher
//! - runs the plan/write/review loop
//! - optionally publishes the report to Google Drive

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use rig_research::llm::{LLMConfig, LLMProvider, OllamaProvider, OpenAIProvider};
use rig_research::search::{SearchProvider, TavilySearch};
use rig_research::storage::{GoogleDriveClient, Permission, StorageGateway};
use rig_research::{ResearchNodes, ResearchWorkflow, WorkflowOutcome};

use crate::config::{Config, Provider};

/// MIME type used for uploaded reports
const REPORT_MIME: &str = "text/markdown";

/// Where a published report ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub file_id: String,
    pub web_view_link: String,
    pub export_link: String,
}

// =============================================================================
// RESEARCH AGENT STRUCT
// =============================================================================
/// Runs research tasks with the configured providers.
pub struct ResearchAgent {
    config: Config,
}

impl ResearchAgent {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn llm_config(&self) -> LLMConfig {
        LLMConfig::new(self.config.effective_model()).with_temperature(self.config.temperature)
    }

    fn build_llm(&self) -> Result<Arc<dyn LLMProvider>> {
        let model = self.config.effective_model();

        let llm: Arc<dyn LLMProvider> = match self.config.provider {
            Provider::OpenAI => {
                // rig's OpenAI client panics without a key; fail with a message instead
                std::env::var("OPENAI_API_KEY")
                    .context("OPENAI_API_KEY must be set to use the openai provider")?;
                Arc::new(OpenAIProvider::from_env_with_model(model))
            }
            Provider::Ollama => Arc::new(
                OllamaProvider::new(&self.config.ollama_host, LLMConfig::new(model))
                    .context("Failed to create the Ollama client")?,
            ),
        };

        debug!(provider = llm.name(), model = %model, "LLM provider ready");
        Ok(llm)
    }

    fn build_search(&self) -> Result<Arc<dyn SearchProvider>> {
        let api_key = self
            .config
            .tavily_api_key
            .as_deref()
            .context("TAVILY_API_KEY must be set to run research")?;

        Ok(Arc::new(
            TavilySearch::new(api_key).with_search_depth(self.config.search_depth),
        ))
    }

    /// Build the workflow from configuration
    pub fn workflow(&self) -> Result<ResearchWorkflow> {
        let nodes = ResearchNodes::new(self.build_llm()?, self.build_search()?)
            .with_max_results(self.config.max_search_results)
            .with_llm_config(self.llm_config());

        Ok(ResearchWorkflow::new(nodes).with_recursion_limit(self.config.recursion_limit))
    }

    /// Research a task and return the finished run.
    pub async fn research(&self, task: &str) -> Result<WorkflowOutcome> {
        info!(
            task = %task,
            provider = %self.config.provider,
            model = %self.config.effective_model(),
            max_revisions = self.config.max_revisions,
            "Starting research task"
        );

        let outcome = self
            .workflow()?
            .run(task, self.config.max_revisions)
            .await
            .context("Research workflow failed")?;

        info!(
            decision = %outcome.decision,
            revisions = outcome.state.revision_number,
            sources = outcome.state.content.len(),
            "Research completed"
        );

        Ok(outcome)
    }

    /// Upload the report file to the configured Drive folder.
    ///
    /// Returns `None` when no Drive folder is configured.
    pub async fn publish(
        &self,
        report_path: &Path,
        share_with: Option<&str>,
    ) -> Result<Option<Publication>> {
        let (Some(folder), Some(token)) = (
            self.config.drive_folder.as_deref(),
            self.config.drive_access_token.as_deref(),
        ) else {
            debug!("No Drive folder configured, skipping publication");
            return Ok(None);
        };

        let gateway = StorageGateway::connect(Arc::new(GoogleDriveClient::new(token)), folder)
            .await
            .with_context(|| format!("Could not open Drive folder '{}'", folder))?;

        publish_to(&gateway, report_path, share_with).await.map(Some)
    }
}

/// Upload, optionally share, and collect links
pub async fn publish_to(
    gateway: &StorageGateway,
    report_path: &Path,
    share_with: Option<&str>,
) -> Result<Publication> {
    let file_id = gateway
        .upload_file(report_path, REPORT_MIME, None)
        .await
        .with_context(|| format!("Failed to upload {}", report_path.display()))?;

    if let Some(email) = share_with {
        let response = gateway
            .create_permission(&file_id, &Permission::reader_for_user(email))
            .await
            .with_context(|| format!("Failed to share report with {}", email))?;
        debug!(response = %response, "Permission created");
        info!(email = %email, "Report shared");
    }

    let web_view_link = gateway
        .get_web_view_link(&file_id)
        .await
        .context("Failed to fetch the report's web view link")?;

    info!(file_id = %file_id, folder = %gateway.folder_name(), "Report published");

    Ok(Publication {
        export_link: StorageGateway::create_export_link(&file_id),
        file_id,
        web_view_link,
    })
}
