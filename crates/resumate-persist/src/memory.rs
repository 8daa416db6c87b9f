use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{AttachmentKind, AttachmentRecord, ListOrder, Sender, StoredMessage, UserProfile};
use crate::store::ConversationStore;

#[derive(Default)]
struct Inner {
    next_seq: u64,
    messages: HashMap<String, Vec<(u64, StoredMessage)>>,
    attachments: HashMap<(AttachmentKind, String), AttachmentRecord>,
    users: HashMap<String, UserProfile>,
}

/// Process-local store. Ordering is by `sent_at`, ties broken by insertion.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user(&self, id: &str) -> Option<UserProfile> {
        self.inner.read().await.users.get(id).cloned()
    }

    pub async fn message_count(&self, thread_id: &str) -> usize {
        self.inner
            .read()
            .await
            .messages
            .get(thread_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn append_message(
        &self,
        thread_id: &str,
        sender: Sender,
        content: &str,
    ) -> Result<StoredMessage> {
        let message = StoredMessage::new(thread_id, sender, content);

        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .messages
            .entry(thread_id.to_string())
            .or_default()
            .push((seq, message.clone()));

        Ok(message)
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        limit: Option<usize>,
        order: ListOrder,
    ) -> Result<Vec<StoredMessage>> {
        let inner = self.inner.read().await;
        let Some(entries) = inner.messages.get(thread_id) else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<&(u64, StoredMessage)> = entries.iter().collect();
        entries.sort_by(|(a_seq, a), (b_seq, b)| {
            a.sent_at.cmp(&b.sent_at).then(a_seq.cmp(b_seq))
        });
        if order == ListOrder::RecentFirst {
            entries.reverse();
        }

        let limit = limit.unwrap_or(usize::MAX);
        Ok(entries
            .into_iter()
            .take(limit)
            .map(|(_, message)| message.clone())
            .collect())
    }

    async fn upsert_attachment(&self, record: AttachmentRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        let key = (record.kind, record.thread_id.clone());

        let record = match inner.attachments.get(&key) {
            Some(existing) => AttachmentRecord {
                created_at: existing.created_at,
                ..record
            },
            None => record,
        };
        inner.attachments.insert(key, record);
        Ok(())
    }

    async fn get_attachment(
        &self,
        kind: AttachmentKind,
        thread_id: &str,
    ) -> Result<Option<AttachmentRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .attachments
            .get(&(kind, thread_id.to_string()))
            .cloned())
    }

    async fn delete_attachment(&self, kind: AttachmentKind, thread_id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .attachments
            .remove(&(kind, thread_id.to_string()))
            .is_some())
    }

    async fn upsert_user(&self, profile: UserProfile) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.users.insert(profile.id.clone(), profile);
        Ok(())
    }
}
