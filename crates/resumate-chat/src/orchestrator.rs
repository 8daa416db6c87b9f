use resumate_llm::{ChatSession, ContentPart, FileRef, LLMClient};
use resumate_persist::{AttachmentKind, ConversationStore, ListOrder, Sender, StoredMessage};
use resumate_types::ChatRequest;
use std::sync::Arc;

use crate::builder::OrchestratorBuilder;
use crate::driver::{GenerationDriver, TurnRequest, TurnStream};
use crate::error::{ChatError, Result};
use crate::normalizer::{normalize, prompt_text};
use crate::prompt::RESUME_REQUIRED_MESSAGE;

/// Which way a turn went after the attachment gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRoute {
    /// Provider stream opened
    Generating,
    /// Thread has no resume; a fixed reply is streamed instead
    AwaitingUpload,
}

/// An accepted turn. The user message is already stored.
pub struct Turn {
    pub thread_id: String,
    pub route: TurnRoute,
    pub stream: TurnStream,
}

/// Per-turn coordinator: validate, persist, gate, generate
pub struct ConversationOrchestrator {
    client: Arc<dyn LLMClient>,
    store: Arc<dyn ConversationStore>,
    driver: GenerationDriver,
}

impl ConversationOrchestrator {
    pub(crate) fn new(
        client: Arc<dyn LLMClient>,
        store: Arc<dyn ConversationStore>,
        driver: GenerationDriver,
    ) -> Self {
        Self {
            client,
            store,
            driver,
        }
    }

    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn client(&self) -> &Arc<dyn LLMClient> {
        &self.client
    }

    pub fn driver(&self) -> &GenerationDriver {
        &self.driver
    }

    /// Run one chat turn up to the point where events start flowing.
    ///
    /// Every error returned here happens before the first event, so callers
    /// can still answer with a plain error status.
    pub async fn handle_turn(&self, request: ChatRequest) -> Result<Turn> {
        let last = request
            .messages
            .last()
            .ok_or_else(|| ChatError::Validation("No messages provided".to_string()))?;

        let prompt = prompt_text(last);
        if prompt.is_empty() {
            return Err(ChatError::Validation("No message content found".to_string()));
        }

        let thread_id = request
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        self.store
            .append_message(&thread_id, Sender::User, &prompt)
            .await?;

        let Some(resume) = self
            .store
            .get_attachment(AttachmentKind::Resume, &thread_id)
            .await?
        else {
            tracing::info!(thread_id = %thread_id, "no resume on thread, asking for upload");
            let stream = self.driver.stream_text(&thread_id, RESUME_REQUIRED_MESSAGE);
            return Ok(Turn {
                thread_id,
                route: TurnRoute::AwaitingUpload,
                stream,
            });
        };

        let mut attachments: Vec<FileRef> = vec![resume.file_ref()];
        match self
            .store
            .get_attachment(AttachmentKind::JobDescription, &thread_id)
            .await
        {
            Ok(Some(job)) => attachments.push(job.file_ref()),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(thread_id = %thread_id, error = %e, "job description lookup failed, continuing without it");
            }
        }

        tracing::info!(
            thread_id = %thread_id,
            attachments = attachments.len(),
            "generating reply"
        );

        let stream = self
            .driver
            .stream(TurnRequest {
                thread_id: thread_id.clone(),
                prompt,
                content: normalize(last),
                attachments,
            })
            .await?;

        Ok(Turn {
            thread_id,
            route: TurnRoute::Generating,
            stream,
        })
    }

    /// One-shot, non-streaming answer outside any thread
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let config = self.driver.config();
        let mut session = ChatSession::new(
            Arc::clone(&self.client),
            config.model.clone(),
            config.generate_options(),
        );

        Ok(session.send_message(vec![ContentPart::text(prompt)]).await?)
    }

    /// Whole thread, oldest first
    pub async fn history(&self, thread_id: &str) -> Result<Vec<StoredMessage>> {
        Ok(self
            .store
            .list_messages(thread_id, None, ListOrder::Chronological)
            .await?)
    }

    /// Most recent first, bounded
    pub async fn recent_messages(&self, thread_id: &str, limit: usize) -> Result<Vec<StoredMessage>> {
        Ok(self
            .store
            .list_messages(thread_id, Some(limit), ListOrder::RecentFirst)
            .await?)
    }
}
