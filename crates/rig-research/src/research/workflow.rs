//! Research workflow runner
//!
//! Drives the nodes in order and applies each update to the state.
//!
//! ```text
//!   plan ─▶ research_plan ─▶ generation ─▶ review ─▶ should_continue
//!                               ▲                        │
//!                               │        to_review       │
//!                     research_critique ◀────────────────┤
//!                                                        │
//!                                       accepted ─▶ accept
//!                                       rejected ─▶ reject
//! ```
//!
//! The check after the first review always answers `to_review`: the editor
//! is only consulted once a critique from an earlier review exists.
//!
//! # Usage
//!
//! ```ignore
//! use rig_research::research::{ResearchNodes, ResearchWorkflow};
//!
//! let workflow = ResearchWorkflow::new(ResearchNodes::new(llm, search))
//!     .with_recursion_limit(25);
//! let outcome = workflow.run("Summarize the state of Rust async runtimes", 2).await?;
//! println!("{}", outcome.state.draft);
//! ```

use std::fmt;

use tracing::{debug, info};

use super::nodes::{Continuation, ResearchNodes};
use super::state::{AgentState, AgentStateUpdate};
use crate::error::ResearchError;

/// Node executions allowed per run
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Workflow steps, as recorded in [`WorkflowOutcome::trace`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeName {
    Plan,
    ResearchPlan,
    Generation,
    Review,
    ResearchCritique,
    Accept,
    Reject,
}

impl NodeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeName::Plan => "plan",
            NodeName::ResearchPlan => "research_plan",
            NodeName::Generation => "generation",
            NodeName::Review => "review",
            NodeName::ResearchCritique => "research_critique",
            NodeName::Accept => "accept",
            NodeName::Reject => "reject",
        }
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub state: AgentState,
    /// Nodes in execution order
    pub trace: Vec<NodeName>,
    /// Terminal decision, `Accepted` or `Rejected`
    pub decision: Continuation,
}

impl WorkflowOutcome {
    pub fn accepted(&self) -> bool {
        self.decision == Continuation::Accepted
    }
}

/// Sequential runner over [`ResearchNodes`]
pub struct ResearchWorkflow {
    nodes: ResearchNodes,
    recursion_limit: usize,
}

impl ResearchWorkflow {
    pub fn new(nodes: ResearchNodes) -> Self {
        Self {
            nodes,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Maximum node executions before the run aborts (default 25)
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Run a fresh task to completion
    pub async fn run(
        &self,
        task: impl Into<String>,
        max_revisions: usize,
    ) -> Result<WorkflowOutcome, ResearchError> {
        self.run_from(AgentState::new(task, max_revisions)).await
    }

    /// Run starting from an existing state
    pub async fn run_from(&self, initial: AgentState) -> Result<WorkflowOutcome, ResearchError> {
        let mut run = Run {
            state: initial,
            trace: Vec::new(),
            limit: self.recursion_limit,
        };

        info!(task = %run.state.task, max_revisions = run.state.max_revisions, "Workflow started");

        self.execute(&mut run, NodeName::Plan).await?;
        self.execute(&mut run, NodeName::ResearchPlan).await?;

        loop {
            self.execute(&mut run, NodeName::Generation).await?;

            let critiqued_before = run.state.has_critique();
            self.execute(&mut run, NodeName::Review).await?;

            let decision = self
                .nodes
                .should_continue_after_review(critiqued_before, &run.state)
                .await?;

            match decision {
                Continuation::ToReview => {
                    self.execute(&mut run, NodeName::ResearchCritique).await?;
                }
                Continuation::Accepted => {
                    self.execute(&mut run, NodeName::Accept).await?;
                    return Ok(run.finish(decision));
                }
                Continuation::Rejected => {
                    self.execute(&mut run, NodeName::Reject).await?;
                    return Ok(run.finish(decision));
                }
            }
        }
    }

    /// Run one node, refusing before any model or search call once the
    /// recursion limit is spent
    async fn execute(&self, run: &mut Run, node: NodeName) -> Result<(), ResearchError> {
        run.reserve()?;

        let state = &run.state;
        let update = match node {
            NodeName::Plan => self.nodes.plan(state).await?,
            NodeName::ResearchPlan => self.nodes.research_plan(state).await?,
            NodeName::Generation => self.nodes.generation(state).await?,
            NodeName::Review => self.nodes.review(state).await?,
            NodeName::ResearchCritique => self.nodes.research_critique(state).await?,
            NodeName::Accept => self.nodes.accept(state),
            NodeName::Reject => self.nodes.reject(state),
        };

        run.apply(node, update);
        Ok(())
    }
}

/// In-flight run bookkeeping
struct Run {
    state: AgentState,
    trace: Vec<NodeName>,
    limit: usize,
}

impl Run {
    fn reserve(&self) -> Result<(), ResearchError> {
        if self.trace.len() >= self.limit {
            return Err(ResearchError::RecursionLimit(self.limit));
        }
        Ok(())
    }

    fn apply(&mut self, node: NodeName, update: AgentStateUpdate) {
        if update.is_empty() {
            debug!(node = %node, step = self.trace.len() + 1, "Node left the state unchanged");
        } else {
            debug!(node = %node, step = self.trace.len() + 1, "Applying node update");
            self.state = self.state.apply_update(update);
        }
        self.trace.push(node);
    }

    fn finish(self, decision: Continuation) -> WorkflowOutcome {
        info!(
            decision = %decision,
            revisions = self.state.revision_number,
            steps = self.trace.len(),
            "Workflow finished"
        );

        WorkflowOutcome {
            state: self.state,
            trace: self.trace,
            decision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_names() {
        assert_eq!(NodeName::ResearchPlan.to_string(), "research_plan");
        assert_eq!(NodeName::ResearchCritique.as_str(), "research_critique");
        assert_eq!(NodeName::Accept.as_str(), "accept");
    }

    #[test]
    fn test_reserve_enforces_limit() {
        let mut run = Run {
            state: AgentState::new("t", 2),
            trace: Vec::new(),
            limit: 2,
        };

        run.reserve().unwrap();
        run.apply(NodeName::Plan, AgentStateUpdate::with_plan("p"));
        run.reserve().unwrap();
        run.apply(NodeName::ResearchPlan, AgentStateUpdate::default());

        let err = run.reserve().unwrap_err();
        assert!(matches!(err, ResearchError::RecursionLimit(2)));
        assert_eq!(run.state.plan, "p");
        assert_eq!(run.trace, vec![NodeName::Plan, NodeName::ResearchPlan]);
    }
}
