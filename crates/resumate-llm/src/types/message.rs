use serde::{Deserialize, Serialize};
use super::content::Content;

/// Conversation turn sent to the provider.
///
/// The system instruction travels separately in `GenerateOptions`, so only
/// the two conversational roles exist here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// User/Human message
    #[serde(rename = "user")]
    Human {
        content: Content,
    },

    /// Model/AI message
    #[serde(rename = "model")]
    AI {
        content: Content,
    },
}

impl Message {
    /// Create human message
    pub fn human(content: impl Into<Content>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    /// Create AI message with text
    pub fn ai(content: impl Into<Content>) -> Self {
        Self::AI {
            content: content.into(),
        }
    }

    /// Get role as string
    pub fn role(&self) -> &str {
        match self {
            Self::Human { .. } => "user",
            Self::AI { .. } => "model",
        }
    }

    pub fn content(&self) -> &Content {
        match self {
            Self::Human { content } | Self::AI { content } => content,
        }
    }
}
