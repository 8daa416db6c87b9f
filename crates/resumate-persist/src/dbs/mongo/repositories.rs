use mongodb::bson::{doc, oid::ObjectId};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::{MongoAttachment, MongoMessage, MongoUser};
use crate::error::Result;
use crate::models::{AttachmentKind, ListOrder, Sender};

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<MongoMessage>,
}

impl MongoMessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }

    pub async fn append(&self, thread_id: &str, sender: Sender, content: &str) -> Result<MongoMessage> {
        let message = MongoMessage {
            id: ObjectId::new(),
            thread_id: thread_id.to_string(),
            sender,
            content: content.to_string(),
            sent_at: Utc::now(),
        };

        self.collection.insert_one(&message).await?;
        Ok(message)
    }

    pub async fn list(
        &self,
        thread_id: &str,
        limit: Option<usize>,
        order: ListOrder,
    ) -> Result<Vec<MongoMessage>> {
        let direction = match order {
            ListOrder::RecentFirst => -1,
            ListOrder::Chronological => 1,
        };

        let options = FindOptions::builder()
            .sort(doc! { "sent_at": direction, "_id": direction })
            .limit(limit.and_then(|l| i64::try_from(l).ok()))
            .build();

        let messages = self
            .collection
            .find(doc! { "thread_id": thread_id })
            .with_options(options)
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }
}

/// One collection per attachment kind, keyed by `thread_id`
#[derive(Clone)]
pub struct MongoAttachmentRepository {
    resumes: Collection<MongoAttachment>,
    job_descriptions: Collection<MongoAttachment>,
}

impl MongoAttachmentRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let db = client.database(db_name);
        Self {
            resumes: db.collection(AttachmentKind::Resume.collection()),
            job_descriptions: db.collection(AttachmentKind::JobDescription.collection()),
        }
    }

    fn collection(&self, kind: AttachmentKind) -> &Collection<MongoAttachment> {
        match kind {
            AttachmentKind::Resume => &self.resumes,
            AttachmentKind::JobDescription => &self.job_descriptions,
        }
    }

    pub async fn upsert(&self, mut attachment: MongoAttachment) -> Result<()> {
        let collection = self.collection(attachment.kind);
        let filter = doc! { "thread_id": attachment.thread_id.as_str() };

        if let Some(existing) = collection.find_one(filter.clone()).await? {
            attachment.created_at = existing.created_at;
        }

        collection.replace_one(filter, &attachment).upsert(true).await?;
        Ok(())
    }

    pub async fn get(&self, kind: AttachmentKind, thread_id: &str) -> Result<Option<MongoAttachment>> {
        Ok(self
            .collection(kind)
            .find_one(doc! { "thread_id": thread_id })
            .await?)
    }

    pub async fn delete(&self, kind: AttachmentKind, thread_id: &str) -> Result<bool> {
        let result = self
            .collection(kind)
            .delete_one(doc! { "thread_id": thread_id })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<MongoUser>,
}

impl MongoUserRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("users");
        Self { collection }
    }

    pub async fn upsert(&self, user: MongoUser) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": user.id.as_str() }, &user)
            .upsert(true)
            .await?;
        Ok(())
    }
}
