use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AttachmentKind, AttachmentRecord, ListOrder, Sender, StoredMessage, UserProfile};

/// Storage operations the conversation core depends on.
///
/// Messages are append-only. Attachments are single-slot per `(kind, thread)`:
/// an upsert replaces whatever was there.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append one message; `sent_at` is assigned by the store
    async fn append_message(
        &self,
        thread_id: &str,
        sender: Sender,
        content: &str,
    ) -> Result<StoredMessage>;

    /// Messages of a thread in the given order, truncated to `limit` after ordering
    async fn list_messages(
        &self,
        thread_id: &str,
        limit: Option<usize>,
        order: ListOrder,
    ) -> Result<Vec<StoredMessage>>;

    async fn upsert_attachment(&self, record: AttachmentRecord) -> Result<()>;

    async fn get_attachment(
        &self,
        kind: AttachmentKind,
        thread_id: &str,
    ) -> Result<Option<AttachmentRecord>>;

    /// Returns whether a record existed
    async fn delete_attachment(&self, kind: AttachmentKind, thread_id: &str) -> Result<bool>;

    async fn upsert_user(&self, profile: UserProfile) -> Result<()>;
}
