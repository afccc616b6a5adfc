//! LLM Provider abstractions
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            ResearchNodes                │
//! └─────────────────┬───────────────────────┘
//!                   │ uses
//!                   ▼
//! ┌─────────────────────────────────────────┐
//! │        LLMProvider (trait)              │
//! │  - complete(messages, config)           │
//! │  - complete_structured(.., schema, ..)  │
//! └─────────────────┬───────────────────────┘
//!          ┌────────┴────────┐
//!          ▼                 ▼
//! ┌─────────────────┐ ┌─────────────────┐
//! │  Rig OpenAI     │ │   Rig Ollama    │
//! └─────────────────┘ └─────────────────┘
//! ```
//!
//! Typed structured output goes through [`generate_structured`], which derives
//! the schema from the target type.

mod config;
mod message;
mod ollama;
mod openai;
mod provider;
mod structured;

pub use config::LLMConfig;
pub use message::{extract_prompt, extract_system_preamble, Message, Role};
pub use ollama::{OllamaProvider, DEFAULT_OLLAMA_HOST};
pub use openai::OpenAIProvider;
pub use provider::{LLMProvider, LLMResponse};
pub use structured::{extract_json, generate_structured, StructuredSchema};
