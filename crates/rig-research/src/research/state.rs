//! Research workflow state
//!
//! [`AgentState`] is threaded through every node. Nodes never mutate it; they
//! return an [`AgentStateUpdate`] that the runner merges with
//! [`AgentState::apply_update`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Revision counter value before the first generation pass
pub const INITIAL_REVISION: usize = 1;

/// The complete workflow state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// The research request, fixed for the whole run
    pub task: String,

    /// Latest plan
    pub plan: String,

    /// Latest report draft
    pub draft: String,

    /// Latest reviewer feedback, empty until the first review
    pub critique: String,

    /// Accumulated search snippets, append-only
    pub content: Vec<String>,

    /// Incremented once per generation pass
    pub revision_number: usize,

    pub max_revisions: usize,

    /// Set once by the accept/reject node
    pub finalized_state: bool,
}

impl AgentState {
    /// Initial state for a task
    pub fn new(task: impl Into<String>, max_revisions: usize) -> Self {
        Self {
            task: task.into(),
            revision_number: INITIAL_REVISION,
            max_revisions,
            ..Default::default()
        }
    }

    pub fn has_critique(&self) -> bool {
        !self.critique.trim().is_empty()
    }

    /// Revision cap exceeded; only then may the editor's "no" become a rejection
    pub fn revisions_exhausted(&self) -> bool {
        self.revision_number > self.max_revisions
    }

    /// Merge a node's partial update into a new state
    pub fn apply_update(&self, update: AgentStateUpdate) -> Self {
        let mut new_state = self.clone();

        if let Some(plan) = update.plan {
            new_state.plan = plan;
        }
        if let Some(draft) = update.draft {
            new_state.draft = draft;
        }
        if let Some(critique) = update.critique {
            new_state.critique = critique;
        }
        if let Some(revision_number) = update.revision_number {
            new_state.revision_number = revision_number;
        }
        if let Some(finalized) = update.finalized_state {
            new_state.finalized_state = finalized;
        }

        // content only grows
        new_state.content.extend(update.new_content);

        new_state
    }
}

/// Partial update produced by one node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStateUpdate {
    pub plan: Option<String>,
    pub draft: Option<String>,
    pub critique: Option<String>,
    /// Snippets to append to `content`
    pub new_content: Vec<String>,
    pub revision_number: Option<usize>,
    pub finalized_state: Option<bool>,
}

impl AgentStateUpdate {
    pub fn with_plan(plan: impl Into<String>) -> Self {
        Self {
            plan: Some(plan.into()),
            ..Default::default()
        }
    }

    pub fn with_draft(draft: impl Into<String>, revision_number: usize) -> Self {
        Self {
            draft: Some(draft.into()),
            revision_number: Some(revision_number),
            ..Default::default()
        }
    }

    pub fn with_critique(critique: impl Into<String>) -> Self {
        Self {
            critique: Some(critique.into()),
            ..Default::default()
        }
    }

    pub fn with_content(content: Vec<String>) -> Self {
        Self {
            new_content: content,
            ..Default::default()
        }
    }

    pub fn finalized(accepted: bool) -> Self {
        Self {
            finalized_state: Some(accepted),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_none()
            && self.draft.is_none()
            && self.critique.is_none()
            && self.new_content.is_empty()
            && self.revision_number.is_none()
            && self.finalized_state.is_none()
    }
}

/// Search queries requested from the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Queries {
    /// Web search queries, most important first
    pub queries: Vec<String>,
}

/// Editor verdict on the current report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FinalizedState {
    /// true when the report is ready to publish
    pub state: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = AgentState::new("Summarize X", 2);

        assert_eq!(state.task, "Summarize X");
        assert_eq!(state.revision_number, 1);
        assert_eq!(state.max_revisions, 2);
        assert!(state.content.is_empty());
        assert!(!state.has_critique());
        assert!(!state.finalized_state);
    }

    #[test]
    fn test_apply_update_overwrites_scalars() {
        let state = AgentState::new("t", 2)
            .apply_update(AgentStateUpdate::with_plan("first plan"))
            .apply_update(AgentStateUpdate::with_plan("second plan"))
            .apply_update(AgentStateUpdate::with_draft("draft", 2));

        assert_eq!(state.plan, "second plan");
        assert_eq!(state.draft, "draft");
        assert_eq!(state.revision_number, 2);
        assert_eq!(state.task, "t");
    }

    #[test]
    fn test_apply_update_appends_content() {
        let state = AgentState::new("t", 2)
            .apply_update(AgentStateUpdate::with_content(vec!["a".into(), "b".into()]))
            .apply_update(AgentStateUpdate::with_content(vec!["c".into()]))
            .apply_update(AgentStateUpdate::with_critique("more sources"));

        assert_eq!(state.content, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_revisions_exhausted_is_strict() {
        let mut state = AgentState::new("t", 2);
        state.revision_number = 2;
        assert!(!state.revisions_exhausted());
        state.revision_number = 3;
        assert!(state.revisions_exhausted());
    }

    #[test]
    fn test_whitespace_critique_counts_as_missing() {
        let state = AgentState::new("t", 2).apply_update(AgentStateUpdate::with_critique("  \n"));
        assert!(!state.has_critique());
    }

    #[test]
    fn test_empty_update() {
        assert!(AgentStateUpdate::default().is_empty());
        assert!(!AgentStateUpdate::finalized(false).is_empty());
    }

    #[test]
    fn test_structured_shapes_deserialize() {
        let queries: Queries =
            serde_json::from_str(r#"{"queries": ["rust async", "tokio runtime"]}"#).unwrap();
        assert_eq!(queries.queries.len(), 2);

        let verdict: FinalizedState = serde_json::from_str(r#"{"state": true}"#).unwrap();
        assert!(verdict.state);
    }
}
