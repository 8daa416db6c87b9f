use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a thread's append-only log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub thread_id: String,
    pub sender: Sender,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(thread_id: impl Into<String>, sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            sender,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Model,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// Order of `list_messages` results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Most recent first
    #[default]
    RecentFirst,
    Chronological,
}

// Conversion: StoredMessage → resumate_llm::Message
impl From<StoredMessage> for resumate_llm::Message {
    fn from(msg: StoredMessage) -> Self {
        match msg.sender {
            Sender::User => resumate_llm::Message::human(msg.content),
            Sender::Model => resumate_llm::Message::ai(msg.content),
        }
    }
}
