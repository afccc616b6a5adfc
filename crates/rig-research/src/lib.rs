//! rig-research: plan/write/review report workflow and Drive storage for Rig
//!
//! - `research`: nodes over a shared [`AgentState`] and a sequential runner
//!   that loops draft → review → research until an editor model accepts or
//!   the revision cap is hit
//! - `llm`: [`LLMProvider`] capability trait with prompt-driven structured
//!   output, backed by Rig's OpenAI and Ollama providers
//! - `search`: [`SearchProvider`] trait and the Tavily client
//! - `storage`: [`StorageGateway`] over any [`DriveApi`] (Google Drive REST or
//!   the in-memory fake)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rig_research::{OpenAIProvider, ResearchNodes, ResearchWorkflow, TavilySearch};
//!
//! let llm = Arc::new(OpenAIProvider::from_env());
//! let search = Arc::new(TavilySearch::from_env()?);
//!
//! let workflow = ResearchWorkflow::new(ResearchNodes::new(llm, search));
//! let outcome = workflow.run("Summarize the history of the Rust borrow checker", 2).await?;
//! ```

pub mod error;
pub mod llm;
pub mod research;
pub mod search;
pub mod storage;

// Re-exports for convenience
pub use error::{ResearchError, SearchError, StorageError};
pub use llm::{
    generate_structured, LLMConfig, LLMProvider, LLMResponse, Message, OllamaProvider,
    OpenAIProvider, Role, StructuredSchema,
};
pub use research::{
    AgentState, AgentStateUpdate, Continuation, FinalizedState, NodeName, Queries,
    ResearchNodes, ResearchPrompts, ResearchWorkflow, WorkflowOutcome,
};
pub use search::{SearchHit, SearchProvider, SearchResponse, TavilySearch};
pub use storage::{
    DriveApi, DriveQuery, FileEntry, FileListing, GoogleDriveClient, InMemoryDrive, Permission,
    StorageGateway,
};
