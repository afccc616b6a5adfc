//! Chat messages exchanged with the language model
//!
//! Nodes speak in a small role-tagged message list. Providers backed by Rig
//! fold system messages into the agent preamble and the remaining turns into
//! a single prompt, see [`extract_system_preamble`] and [`extract_prompt`].

use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Extract system message content for use as preamble
///
/// Returns the combined content of all system messages.
pub fn extract_system_preamble(messages: &[Message]) -> Option<String> {
    let system_messages: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    if system_messages.is_empty() {
        None
    } else {
        Some(system_messages.join("\n\n"))
    }
}

/// Join every user message, in order, into one prompt
///
/// The editor check sends the critique and the gathered content as two
/// separate user turns; both must reach the model.
pub fn extract_prompt(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
