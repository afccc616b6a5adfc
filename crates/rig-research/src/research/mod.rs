//! Research report workflow
//!
//! Plans a report, gathers search results, drafts, critiques and revises
//! until an editor model accepts the draft or the revision cap is reached.
//!
//! # Module Structure
//!
//! - `state` - [`AgentState`], its partial updates, and the structured shapes
//!   requested from the model
//! - `prompts` - system prompts for every model call
//! - `nodes` - the node functions and the continuation check
//! - `workflow` - the sequential runner

mod nodes;
mod prompts;
mod state;
mod workflow;

pub use nodes::{Continuation, ResearchNodes, DEFAULT_MAX_RESULTS};
pub use prompts::ResearchPrompts;
pub use state::{AgentState, AgentStateUpdate, FinalizedState, Queries, INITIAL_REVISION};
pub use workflow::{NodeName, ResearchWorkflow, WorkflowOutcome, DEFAULT_RECURSION_LIMIT};
