//! Inbound chat payloads.
//!
//! Clients have sent three shapes over time: flat `content`, typed `parts`, and
//! `experimental_attachments` next to flat content. All of them deserialize
//! into [`ClientMessage`]; field names follow the client SDK.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ClientMessage>,
    /// Thread id; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<ClientMessagePart>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental_attachments: Option<Vec<ClientAttachment>>,
    #[serde(
        default,
        rename = "toolInvocations",
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_invocations: Option<Vec<ToolInvocation>>,
}

impl ClientMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_parts(role: impl Into<String>, parts: Vec<ClientMessagePart>) -> Self {
        Self {
            role: role.into(),
            parts: Some(parts),
            ..Default::default()
        }
    }
}

/// One typed part. `kind` is open-ended (`text`, `file`, `tool-<name>`,
/// `step-start`, ...) so unknown part types still deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMessagePart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, alias = "mediaType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl ClientMessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn file(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            kind: "file".to_string(),
            url: Some(url.into()),
            content_type: Some(content_type.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content_type: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolInvocationState {
    Call,
    PartialCall,
    Result,
}

/// Legacy tool invocation record; client rendering state only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub state: ToolInvocationState,
    pub tool_call_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub result: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_content_request() {
        let request: ChatRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "Hello"}],
            "id": "t1"
        }))
        .unwrap();

        assert_eq!(request.id.as_deref(), Some("t1"));
        assert_eq!(request.messages[0].content.as_deref(), Some("Hello"));
        assert!(request.messages[0].parts.is_none());
    }

    #[test]
    fn test_parts_request_with_unknown_part_types() {
        let request: ChatRequest = serde_json::from_value(json!({
            "messages": [{
                "role": "user",
                "parts": [
                    {"type": "step-start"},
                    {"type": "text", "text": "Review this"},
                    {"type": "file", "mediaType": "image/png", "url": "https://img/1.png"},
                    {"type": "tool-get_message_history", "toolCallId": "c1", "state": "output-available", "output": {"ok": true}}
                ]
            }]
        }))
        .unwrap();

        let parts = request.messages[0].parts.as_ref().unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[2].content_type.as_deref(), Some("image/png"));
        assert_eq!(parts[3].tool_call_id.as_deref(), Some("c1"));
        assert!(request.id.is_none());
    }

    #[test]
    fn test_legacy_attachments_and_tool_invocations() {
        let message: ClientMessage = serde_json::from_value(json!({
            "role": "user",
            "content": "see image",
            "experimental_attachments": [
                {"name": "a.png", "contentType": "image/png", "url": "https://img/a.png"}
            ],
            "toolInvocations": [
                {"state": "partial-call", "toolCallId": "c1", "toolName": "get_message_history", "args": {}}
            ]
        }))
        .unwrap();

        assert_eq!(message.experimental_attachments.unwrap()[0].content_type, "image/png");
        let invocations = message.tool_invocations.unwrap();
        assert_eq!(invocations[0].state, ToolInvocationState::PartialCall);
        assert!(invocations[0].result.is_null());
    }

    #[test]
    fn test_missing_messages_defaults_to_empty() {
        let request: ChatRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.messages.is_empty());
    }
}
