//! Integration tests for the research workflow
//!
//! Runs the full node loop against a scripted model and a canned search
//! provider:
//! - node order through the critique loop
//! - the first review always loops into research_critique
//! - accept / reject decisions against the revision cap
//! - append-only content
//! - recursion limit on runaway loops

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rig_research::llm::{LLMConfig, LLMProvider, LLMResponse, Message, Role};
use rig_research::search::{SearchHit, SearchProvider, SearchResponse};
use rig_research::{
    AgentState, AgentStateUpdate, Continuation, NodeName, ResearchError, ResearchNodes,
    ResearchPrompts, ResearchWorkflow, SearchError,
};

/// Model that answers by recognizing the system prompt of each node
struct ScriptedLlm {
    /// Editor verdicts in call order; `false` once exhausted
    verdicts: Mutex<VecDeque<bool>>,
    critique: String,
    drafts: Mutex<usize>,
    editor_calls: Mutex<usize>,
}

impl ScriptedLlm {
    fn new(verdicts: &[bool]) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.iter().copied().collect()),
            critique: "Add more recent sources.".to_string(),
            drafts: Mutex::new(0),
            editor_calls: Mutex::new(0),
        }
    }

    fn with_critique(mut self, critique: &str) -> Self {
        self.critique = critique.to_string();
        self
    }

    fn editor_calls(&self) -> usize {
        *self.editor_calls.lock().unwrap()
    }
}

#[async_trait]
impl LLMProvider for ScriptedLlm {
    async fn complete(
        &self,
        messages: &[Message],
        _config: Option<&LLMConfig>,
    ) -> Result<LLMResponse, ResearchError> {
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let reply = if system == ResearchPrompts::research_plan() {
            r#"{"queries": ["plan query 1", "plan query 2"]}"#.to_string()
        } else if system == ResearchPrompts::research_critique() {
            r#"```json
{"queries": ["critique query"]}
```"#
                .to_string()
        } else if system == ResearchPrompts::editor() {
            *self.editor_calls.lock().unwrap() += 1;
            let verdict = self.verdicts.lock().unwrap().pop_front().unwrap_or(false);
            format!(r#"{{"state": {}}}"#, verdict)
        } else if system == ResearchPrompts::review() {
            self.critique.clone()
        } else if system.starts_with(&ResearchPrompts::write("")) {
            let mut drafts = self.drafts.lock().unwrap();
            *drafts += 1;
            format!("# Report v{}", *drafts)
        } else {
            "1. Background\n2. Findings\n3. Outlook".to_string()
        };

        Ok(LLMResponse::new(reply))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }
}

/// Returns two hits per query and remembers the queries
#[derive(Default)]
struct CannedSearch {
    queries: Mutex<Vec<String>>,
}

#[async_trait]
impl SearchProvider for CannedSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, SearchError> {
        assert_eq!(max_results, 5);
        self.queries.lock().unwrap().push(query.to_string());

        Ok(SearchResponse {
            query: query.to_string(),
            answer: None,
            results: vec![
                SearchHit::new("first", "https://example.com/1", format!("{} / a", query)),
                SearchHit::new("second", "https://example.com/2", format!("{} / b", query)),
            ],
        })
    }

    fn name(&self) -> &str {
        "canned"
    }
}

fn workflow(llm: Arc<ScriptedLlm>, search: Arc<CannedSearch>) -> ResearchWorkflow {
    ResearchWorkflow::new(ResearchNodes::new(llm, search))
}

fn count(trace: &[NodeName], node: NodeName) -> usize {
    trace.iter().filter(|n| **n == node).count()
}

#[tokio::test]
async fn test_first_review_loops_even_when_editor_would_accept() {
    let llm = Arc::new(ScriptedLlm::new(&[true]));
    let search = Arc::new(CannedSearch::default());

    let outcome = workflow(llm.clone(), search).run("Summarize X", 2).await.unwrap();

    assert_eq!(
        outcome.trace,
        vec![
            NodeName::Plan,
            NodeName::ResearchPlan,
            NodeName::Generation,
            NodeName::Review,
            NodeName::ResearchCritique,
            NodeName::Generation,
            NodeName::Review,
            NodeName::Accept,
        ]
    );
    assert_eq!(outcome.decision, Continuation::Accepted);
    assert!(outcome.accepted());
    assert!(outcome.state.finalized_state);
    assert_eq!(outcome.state.revision_number, 3);
    assert_eq!(outcome.state.draft, "# Report v2");
    assert_eq!(outcome.state.critique, "Add more recent sources.");
    // the check after the first review does not ask the editor
    assert_eq!(llm.editor_calls(), 1);
}

#[tokio::test]
async fn test_critique_loop_then_accept() {
    let llm = Arc::new(ScriptedLlm::new(&[false, true]));
    let search = Arc::new(CannedSearch::default());

    let outcome = workflow(llm.clone(), search).run("Summarize X", 3).await.unwrap();

    assert_eq!(outcome.decision, Continuation::Accepted);
    assert_eq!(count(&outcome.trace, NodeName::Review), 3);
    assert_eq!(count(&outcome.trace, NodeName::ResearchCritique), 2);
    assert_eq!(outcome.trace.last(), Some(&NodeName::Accept));
    assert_eq!(outcome.state.revision_number, 4);
    assert_eq!(outcome.state.draft, "# Report v3");
    assert_eq!(llm.editor_calls(), 2);
}

#[tokio::test]
async fn test_first_generation_sets_revision_two() {
    let nodes = ResearchNodes::new(
        Arc::new(ScriptedLlm::new(&[])),
        Arc::new(CannedSearch::default()),
    );

    let state = AgentState::new("Summarize X", 2);
    let state = state.apply_update(nodes.generation(&state).await.unwrap());

    assert_eq!(state.revision_number, 2);
    assert_eq!(state.draft, "# Report v1");
}

#[tokio::test]
async fn test_revision_cap_never_fires_on_first_review() {
    let llm = Arc::new(ScriptedLlm::new(&[]));
    let search = Arc::new(CannedSearch::default());

    let outcome = workflow(llm.clone(), search).run("Summarize X", 1).await.unwrap();

    assert_eq!(outcome.decision, Continuation::Rejected);
    assert!(count(&outcome.trace, NodeName::Review) >= 2);
    assert_eq!(
        outcome.trace,
        vec![
            NodeName::Plan,
            NodeName::ResearchPlan,
            NodeName::Generation,
            NodeName::Review,
            NodeName::ResearchCritique,
            NodeName::Generation,
            NodeName::Review,
            NodeName::Reject,
        ]
    );
    assert_eq!(llm.editor_calls(), 1);
}

#[tokio::test]
async fn test_editor_never_satisfied_rejects_after_cap() {
    let llm = Arc::new(ScriptedLlm::new(&[]));
    let search = Arc::new(CannedSearch::default());

    let outcome = workflow(llm, search).run("Summarize X", 2).await.unwrap();

    assert_eq!(outcome.decision, Continuation::Rejected);
    assert!(!outcome.state.finalized_state);
    assert_eq!(outcome.trace.last(), Some(&NodeName::Reject));
    // rejection only once revision_number exceeds max_revisions
    assert_eq!(outcome.state.revision_number, 3);
    assert!(outcome.state.revision_number > outcome.state.max_revisions);
}

#[tokio::test]
async fn test_content_is_append_only_and_ordered() {
    let llm = Arc::new(ScriptedLlm::new(&[true]));
    let search = Arc::new(CannedSearch::default());

    let outcome = workflow(llm, search.clone()).run("Summarize X", 2).await.unwrap();

    assert_eq!(
        *search.queries.lock().unwrap(),
        vec!["plan query 1", "plan query 2", "critique query"]
    );
    assert_eq!(
        outcome.state.content,
        vec![
            "plan query 1 / a",
            "plan query 1 / b",
            "plan query 2 / a",
            "plan query 2 / b",
            "critique query / a",
            "critique query / b",
        ]
    );
}

#[tokio::test]
async fn test_blank_critique_loops_until_recursion_limit() {
    let llm = Arc::new(ScriptedLlm::new(&[true]).with_critique(""));
    let search = Arc::new(CannedSearch::default());

    let err = workflow(llm.clone(), search.clone())
        .with_recursion_limit(10)
        .run("Summarize X", 2)
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::RecursionLimit(10)));
    // the editor is never consulted without a critique
    assert_eq!(llm.editor_calls(), 0);
    // the node past the limit never searched: two plan queries, two critique passes
    assert_eq!(search.queries.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_should_continue_rejects_past_cap() {
    let llm = Arc::new(ScriptedLlm::new(&[false]));
    let nodes = ResearchNodes::new(llm, Arc::new(CannedSearch::default()));

    let mut state = AgentState::new("Summarize X", 2)
        .apply_update(AgentStateUpdate::with_critique("Too shallow."));
    state.revision_number = 3;

    assert_eq!(
        nodes.should_continue(&state).await.unwrap(),
        Continuation::Rejected
    );
}

#[tokio::test]
async fn test_should_continue_accept_bypasses_cap() {
    let llm = Arc::new(ScriptedLlm::new(&[true]));
    let nodes = ResearchNodes::new(llm, Arc::new(CannedSearch::default()));

    let mut state = AgentState::new("Summarize X", 2)
        .apply_update(AgentStateUpdate::with_critique("Looks good."));
    state.revision_number = 7;

    assert_eq!(
        nodes.should_continue(&state).await.unwrap(),
        Continuation::Accepted
    );
}

#[tokio::test]
async fn test_should_continue_without_critique() {
    let llm = Arc::new(ScriptedLlm::new(&[true]));
    let nodes = ResearchNodes::new(llm.clone(), Arc::new(CannedSearch::default()));

    let mut state = AgentState::new("Summarize X", 2);
    state.revision_number = 9;

    assert_eq!(
        nodes.should_continue(&state).await.unwrap(),
        Continuation::ToReview
    );
    assert_eq!(llm.editor_calls(), 0);
}

/// Search failures propagate out of the run unchanged
#[tokio::test]
async fn test_search_failure_propagates() {
    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _query: &str, _max: usize) -> Result<SearchResponse, SearchError> {
            Err(SearchError::RateLimited)
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    let llm = Arc::new(ScriptedLlm::new(&[true]));
    let workflow = ResearchWorkflow::new(ResearchNodes::new(llm, Arc::new(FailingSearch)));

    let err = workflow.run("Summarize X", 2).await.unwrap_err();
    assert!(matches!(err, ResearchError::Search(SearchError::RateLimited)));
}
