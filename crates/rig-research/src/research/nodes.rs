//! Research workflow nodes
//!
//! Each node reads the state, calls the model and/or the search provider, and
//! returns an [`AgentStateUpdate`]. Provider errors are not caught here.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::prompts::ResearchPrompts;
use super::state::{AgentState, AgentStateUpdate, FinalizedState, Queries};
use crate::error::ResearchError;
use crate::llm::{generate_structured, LLMConfig, LLMProvider, Message};
use crate::search::SearchProvider;

/// Results kept per search query
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Outcome of the continuation check after a review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Gather more content from the critique and revise
    ToReview,
    Accepted,
    Rejected,
}

impl Continuation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Continuation::ToReview => "to_review",
            Continuation::Accepted => "accepted",
            Continuation::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node functions over a shared model and search provider
pub struct ResearchNodes {
    llm: Arc<dyn LLMProvider>,
    searcher: Arc<dyn SearchProvider>,
    max_results: usize,
    llm_config: Option<LLMConfig>,
}

impl ResearchNodes {
    pub fn new(llm: Arc<dyn LLMProvider>, searcher: Arc<dyn SearchProvider>) -> Self {
        Self {
            llm,
            searcher,
            max_results: DEFAULT_MAX_RESULTS,
            llm_config: None,
        }
    }

    /// Results kept per query (default 5)
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Per-call model settings passed to every completion
    pub fn with_llm_config(mut self, config: LLMConfig) -> Self {
        self.llm_config = Some(config);
        self
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, ResearchError> {
        let response = self.llm.complete(messages, self.llm_config.as_ref()).await?;
        Ok(response.content)
    }

    /// Run each query in order, keeping the text of up to `max_results` hits per query
    async fn search_all(&self, queries: &[String]) -> Result<Vec<String>, ResearchError> {
        let mut content = Vec::new();

        for query in queries {
            let response = self.searcher.search(query, self.max_results).await?;
            debug!(
                query = %query,
                hits = response.results.len(),
                provider = self.searcher.name(),
                "Search complete"
            );
            content.extend(
                response
                    .results
                    .into_iter()
                    .take(self.max_results)
                    .map(|hit| hit.content),
            );
        }

        Ok(content)
    }

    async fn queries_for(&self, messages: &[Message]) -> Result<Vec<String>, ResearchError> {
        let queries: Queries =
            generate_structured(self.llm.as_ref(), messages, self.llm_config.as_ref()).await?;
        Ok(queries.queries)
    }

    /// Draft a plan for the task
    pub async fn plan(&self, state: &AgentState) -> Result<AgentStateUpdate, ResearchError> {
        info!(task = %state.task, "Planning");

        let messages = [
            Message::system(ResearchPrompts::plan()),
            Message::user(&state.task),
        ];
        let plan = self.complete(&messages).await?;

        Ok(AgentStateUpdate::with_plan(plan))
    }

    /// Expand the task and plan into queries and collect their results
    pub async fn research_plan(&self, state: &AgentState) -> Result<AgentStateUpdate, ResearchError> {
        let messages = [
            Message::system(ResearchPrompts::research_plan()),
            Message::user(format!("{}\n\nHere is my plan:\n\n{}", state.task, state.plan)),
        ];
        let queries = self.queries_for(&messages).await?;
        info!(queries = queries.len(), "Researching plan");

        Ok(AgentStateUpdate::with_content(self.search_all(&queries).await?))
    }

    /// Write a draft from the plan and gathered content
    pub async fn generation(&self, state: &AgentState) -> Result<AgentStateUpdate, ResearchError> {
        let messages = [
            Message::system(ResearchPrompts::write(&state.content.join("\n\n"))),
            Message::user(format!("{}\n\nHere is my plan:\n\n{}", state.task, state.plan)),
        ];
        let draft = self.complete(&messages).await?;
        let revision_number = state.revision_number + 1;

        info!(revision = revision_number, chars = draft.len(), "Draft generated");

        Ok(AgentStateUpdate::with_draft(draft, revision_number))
    }

    /// Critique the current draft
    pub async fn review(&self, state: &AgentState) -> Result<AgentStateUpdate, ResearchError> {
        let messages = [
            Message::system(ResearchPrompts::review()),
            Message::user(&state.draft),
        ];
        let critique = self.complete(&messages).await?;

        info!(chars = critique.len(), "Review complete");

        Ok(AgentStateUpdate::with_critique(critique))
    }

    /// Search for material that addresses the critique
    pub async fn research_critique(
        &self,
        state: &AgentState,
    ) -> Result<AgentStateUpdate, ResearchError> {
        let messages = [
            Message::system(ResearchPrompts::research_critique()),
            Message::user(&state.critique),
        ];
        let queries = self.queries_for(&messages).await?;
        info!(queries = queries.len(), "Researching critique");

        Ok(AgentStateUpdate::with_content(self.search_all(&queries).await?))
    }

    /// Decide whether to loop, accept or reject
    ///
    /// The revision cap is only consulted when the editor declines, so an
    /// accepting editor ends the run regardless of the revision count.
    pub async fn should_continue(&self, state: &AgentState) -> Result<Continuation, ResearchError> {
        self.continuation(state.has_critique(), state).await
    }

    /// Continuation check for a state that has just been reviewed
    ///
    /// `critiqued_before` tells whether a critique existed before that review.
    /// Without one the run loops into `research_critique`, so the first
    /// review can neither accept nor reject.
    pub async fn should_continue_after_review(
        &self,
        critiqued_before: bool,
        state: &AgentState,
    ) -> Result<Continuation, ResearchError> {
        self.continuation(critiqued_before, state).await
    }

    async fn continuation(
        &self,
        critiqued: bool,
        state: &AgentState,
    ) -> Result<Continuation, ResearchError> {
        if !critiqued {
            return Ok(Continuation::ToReview);
        }

        let messages = [
            Message::system(ResearchPrompts::editor()),
            Message::user(format!("The previous critique: {}", state.critique)),
            Message::user(format!("The current essay: {}", state.content.join("\n\n"))),
        ];
        let verdict: FinalizedState =
            generate_structured(self.llm.as_ref(), &messages, self.llm_config.as_ref()).await?;

        let decision = if verdict.state {
            Continuation::Accepted
        } else if state.revisions_exhausted() {
            Continuation::Rejected
        } else {
            Continuation::ToReview
        };

        info!(
            decision = %decision,
            revision = state.revision_number,
            max_revisions = state.max_revisions,
            "Continuation decided"
        );

        Ok(decision)
    }

    pub fn accept(&self, _state: &AgentState) -> AgentStateUpdate {
        AgentStateUpdate::finalized(true)
    }

    pub fn reject(&self, _state: &AgentState) -> AgentStateUpdate {
        AgentStateUpdate::finalized(false)
    }
}
