use async_trait::async_trait;
use mongodb::Client;

use crate::dbs::mongo::repositories::{
    MongoAttachmentRepository, MongoMessageRepository, MongoUserRepository,
};
use crate::error::{PersistError, Result};
use crate::models::{AttachmentKind, AttachmentRecord, ListOrder, Sender, StoredMessage, UserProfile};
use crate::store::ConversationStore;

pub struct MongoConversationStore {
    messages: MongoMessageRepository,
    attachments: MongoAttachmentRepository,
    users: MongoUserRepository,
}

impl MongoConversationStore {
    /// Connect to MongoDB and create the store
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::info!(database, "connected to MongoDB");

        Ok(Self {
            messages: MongoMessageRepository::new(&client, database),
            attachments: MongoAttachmentRepository::new(&client, database),
            users: MongoUserRepository::new(&client, database),
        })
    }
}

#[async_trait]
impl ConversationStore for MongoConversationStore {
    async fn append_message(
        &self,
        thread_id: &str,
        sender: Sender,
        content: &str,
    ) -> Result<StoredMessage> {
        let message = self.messages.append(thread_id, sender, content).await?;
        Ok(message.into())
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        limit: Option<usize>,
        order: ListOrder,
    ) -> Result<Vec<StoredMessage>> {
        let messages = self.messages.list(thread_id, limit, order).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn upsert_attachment(&self, record: AttachmentRecord) -> Result<()> {
        self.attachments.upsert(record.into()).await
    }

    async fn get_attachment(
        &self,
        kind: AttachmentKind,
        thread_id: &str,
    ) -> Result<Option<AttachmentRecord>> {
        Ok(self.attachments.get(kind, thread_id).await?.map(Into::into))
    }

    async fn delete_attachment(&self, kind: AttachmentKind, thread_id: &str) -> Result<bool> {
        self.attachments.delete(kind, thread_id).await
    }

    async fn upsert_user(&self, profile: UserProfile) -> Result<()> {
        self.users.upsert(profile.into()).await
    }
}
