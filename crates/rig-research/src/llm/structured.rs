//! Structured output via prompting
//!
//! A shape is declared once as a Rust type deriving `JsonSchema`; the schema
//! is shown to the model and the reply is deserialized back into the type.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use super::config::LLMConfig;
use super::message::Message;
use super::provider::LLMProvider;
use crate::error::ResearchError;

/// A named JSON schema the model output must conform to
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

impl StructuredSchema {
    pub fn new(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Derive the schema of `T`
    pub fn of<T: JsonSchema>() -> Result<Self, ResearchError> {
        let schema = schemars::schema_for!(T);
        Ok(Self::new(T::schema_name().to_string(), serde_json::to_value(schema)?))
    }

    /// System instruction asking the model to answer with this shape only
    pub fn instruction(&self) -> String {
        let schema = serde_json::to_string_pretty(&self.schema).unwrap_or_default();
        format!(
            "Respond with a single JSON object named `{}` that conforms to the JSON schema below. \
             Output only the JSON object, with no commentary.\n\n{}",
            self.name, schema
        )
    }
}

/// Pull a JSON object out of a model reply
///
/// Accepts bare JSON, JSON inside a Markdown code fence, or JSON surrounded by prose.
pub fn extract_json(text: &str) -> Result<serde_json::Value, ResearchError> {
    let trimmed = strip_code_fence(text.trim());

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return Ok(value);
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str(&trimmed[start..=end]).map_err(|e| {
                ResearchError::StructuredOutput(format!("Invalid JSON in model reply: {}", e))
            })
        }
        _ => Err(ResearchError::StructuredOutput(format!(
            "No JSON object in model reply: {}",
            truncate(trimmed, 200)
        ))),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line, e.g. ```json
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Ask `llm` for an instance of `T`
///
/// ```rust,ignore
/// let queries: Queries = generate_structured(llm.as_ref(), &messages, None).await?;
/// ```
pub async fn generate_structured<T, L>(
    llm: &L,
    messages: &[Message],
    config: Option<&LLMConfig>,
) -> Result<T, ResearchError>
where
    T: JsonSchema + DeserializeOwned,
    L: LLMProvider + ?Sized,
{
    let schema = StructuredSchema::of::<T>()?;
    let value = llm.complete_structured(messages, &schema, config).await?;

    serde_json::from_value(value).map_err(|e| {
        ResearchError::StructuredOutput(format!("Reply did not match {}: {}", schema.name, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Verdict {
        state: bool,
    }

    #[test]
    fn test_extract_bare_json() {
        let value = extract_json(r#"{"queries": ["a", "b"]}"#).unwrap();
        assert_eq!(value["queries"][1], "b");
    }

    #[test]
    fn test_extract_fenced_json() {
        let value = extract_json("```json\n{\"state\": false}\n```").unwrap();
        assert_eq!(value, serde_json::json!({"state": false}));
    }

    #[test]
    fn test_extract_json_in_prose() {
        let value = extract_json("Sure! Here it is: {\"state\": true} Hope that helps.").unwrap();
        assert_eq!(value, serde_json::json!({"state": true}));
    }

    #[test]
    fn test_extract_json_missing() {
        assert!(matches!(
            extract_json("no braces here"),
            Err(ResearchError::StructuredOutput(_))
        ));
    }

    #[test]
    fn test_schema_of_type() {
        let schema = StructuredSchema::of::<Verdict>().unwrap();
        assert_eq!(schema.name, "Verdict");
        assert!(schema.schema["properties"]["state"].is_object());
        assert!(schema.instruction().contains("`Verdict`"));
    }
}
