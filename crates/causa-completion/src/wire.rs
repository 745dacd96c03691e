//! Chat completion wire types.
//!
//! These mirror the vendor's request body and response envelope. Only the
//! fields this crate reads or writes are modelled; unknown fields in the
//! response are ignored.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display};

use crate::error::{Error, Result};
use crate::TRACING_TARGET_CLIENT;

/// The author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single message in the `messages` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Creates a new message.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }
}

/// Output format hint sent as `response_format`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// `{"type": "json_object"}`: any JSON object.
    JsonObject,
    /// `{"type": "json_schema", "json_schema": {..}}`: a named schema.
    JsonSchema { json_schema: JsonSchemaFormat },
}

/// Named JSON schema carried by [`ResponseFormat::JsonSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub strict: bool,
    pub schema: Value,
}

impl ResponseFormat {
    /// Builds a JSON-schema hint from a type's [`JsonSchema`] implementation.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the generated schema cannot be
    /// converted to JSON.
    pub fn json_schema_for<T: JsonSchema>() -> Result<Self> {
        let name = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("response_schema")
            .to_owned();

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            schema_name = %name,
            "Generating JSON schema response format"
        );

        let schema = schemars::schema_for!(T);
        let schema = serde_json::to_value(&schema).map_err(Error::from)?;

        Ok(Self::JsonSchema {
            json_schema: JsonSchemaFormat {
                name,
                strict: false,
                schema,
            },
        })
    }
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Response envelope for a chat completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// One entry of `choices`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The `message` object of a choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting reported by the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    /// Returns the text of the first choice, if any non-blank text is present.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .filter(|content| !content.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_serializes_vendor_fields() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![ChatMessage::system("json only"), ChatMessage::user("hi")],
            temperature: 0.1,
            max_tokens: 256,
            response_format: Some(ResponseFormat::JsonObject),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "json only"},
                    {"role": "user", "content": "hi"}
                ],
                "temperature": 0.1,
                "max_tokens": 256,
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn response_format_is_omitted_when_absent() {
        let request = ChatCompletionRequest {
            model: "m".into(),
            messages: vec![],
            temperature: 0.0,
            max_tokens: 1,
            response_format: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("response_format").is_none());
    }

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Answer {
        answer: String,
    }

    #[test]
    fn json_schema_hint_uses_type_name() {
        let format = ResponseFormat::json_schema_for::<Answer>().unwrap();
        let ResponseFormat::JsonSchema { json_schema } = format else {
            panic!("expected a json_schema format");
        };
        assert_eq!(json_schema.name, "Answer");
        assert!(json_schema.schema.get("properties").is_some());
    }

    #[test]
    fn first_content_skips_blank_text() {
        let envelope: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "  \n"}}]
        }))
        .unwrap();
        assert!(envelope.first_content().is_none());

        let envelope: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": null}}]
        }))
        .unwrap();
        assert!(envelope.first_content().is_none());

        let envelope: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(envelope.first_content().is_none());
    }

    #[test]
    fn envelope_reads_usage_and_model() {
        let envelope: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini-2024",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }))
        .unwrap();

        assert_eq!(envelope.first_content(), Some("{}"));
        assert_eq!(envelope.model.as_deref(), Some("gpt-4o-mini-2024"));
        assert_eq!(envelope.usage.unwrap().total_tokens, 15);
    }
}
