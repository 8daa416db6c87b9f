use serde::{Deserialize, Serialize};

/// Id shared by the single text block each assistant reply carries
pub const TEXT_BLOCK_ID: &str = "text-1";

/// UI message stream event, serialized as the `data:` payload of one SSE frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    /// Opens the assistant message
    Start {
        #[serde(rename = "messageId")]
        message_id: String,
    },

    TextStart {
        id: String,
    },

    /// Incremental fragment of assistant text
    TextDelta {
        id: String,
        delta: String,
    },

    TextEnd {
        id: String,
    },

    Finish,

    /// Closing `[DONE]` frame; has no JSON form
    #[serde(skip)]
    Terminator,
}

impl StreamEvent {
    /// `start` with a fresh `msg-<hex>` id
    pub fn start() -> Self {
        Self::Start {
            message_id: format!("msg-{}", uuid::Uuid::new_v4().simple()),
        }
    }

    pub fn text_start() -> Self {
        Self::TextStart {
            id: TEXT_BLOCK_ID.to_string(),
        }
    }

    pub fn text_delta(delta: impl Into<String>) -> Self {
        Self::TextDelta {
            id: TEXT_BLOCK_ID.to_string(),
            delta: delta.into(),
        }
    }

    pub fn text_end() -> Self {
        Self::TextEnd {
            id: TEXT_BLOCK_ID.to_string(),
        }
    }

    /// Wire tag as it appears in the `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::TextStart { .. } => "text-start",
            Self::TextDelta { .. } => "text-delta",
            Self::TextEnd { .. } => "text-end",
            Self::Finish => "finish",
            Self::Terminator => "[DONE]",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminator)
    }
}
