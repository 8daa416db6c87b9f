use resumate_llm::{wait_until_active, FileUpload, LLMClient, PollPolicy};
use resumate_persist::{AttachmentKind, AttachmentRecord, ConversationStore};
use std::sync::Arc;

use crate::error::{ChatError, Result};

/// Uploads resumes and job descriptions and keeps one record per thread and kind
#[derive(Clone)]
pub struct AttachmentService {
    client: Arc<dyn LLMClient>,
    store: Arc<dyn ConversationStore>,
    poll: PollPolicy,
}

impl AttachmentService {
    pub fn new(client: Arc<dyn LLMClient>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            client,
            store,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Upload, wait for processing, then replace the thread's record.
    ///
    /// A missing thread id gets a fresh one; a missing file name falls back to
    /// the kind's default.
    pub async fn upload(
        &self,
        kind: AttachmentKind,
        thread_id: Option<String>,
        file_name: Option<String>,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<AttachmentRecord> {
        let thread_id = thread_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let file_name = file_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| kind.default_file_name().to_string());

        tracing::info!(
            thread_id = %thread_id,
            kind = kind.label(),
            file_name = %file_name,
            bytes = bytes.len(),
            "uploading attachment"
        );

        let uploaded = self
            .client
            .upload_file(FileUpload::new(bytes, mime_type, file_name.clone()))
            .await
            .map_err(|e| ChatError::Upload(format!("{e:#}")))?;

        let file = wait_until_active(self.client.as_ref(), uploaded, self.poll)
            .await
            .map_err(|e| ChatError::Upload(format!("{e:#}")))?;

        let size_bytes = file.size_bytes.as_deref().and_then(|s| s.parse::<u64>().ok());
        let record = AttachmentRecord::new(
            kind,
            thread_id,
            file_name,
            file.name.clone(),
            file.uri.clone(),
            file.mime_type.clone(),
        )
        .with_size(size_bytes);

        self.store.upsert_attachment(record.clone()).await?;

        tracing::info!(
            thread_id = %record.thread_id,
            kind = kind.label(),
            provider_file = %record.provider_file_name,
            "attachment stored"
        );

        Ok(record)
    }

    pub async fn get(&self, kind: AttachmentKind, thread_id: &str) -> Result<Option<AttachmentRecord>> {
        Ok(self.store.get_attachment(kind, thread_id).await?)
    }

    pub async fn delete(&self, kind: AttachmentKind, thread_id: &str) -> Result<bool> {
        Ok(self.store.delete_attachment(kind, thread_id).await?)
    }
}
