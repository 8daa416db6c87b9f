use anyhow::Result;
use std::sync::Arc;

use crate::traits::{GenerateOptions, GenerateRequest, GenerationClient, LLMClient};
use crate::types::{Content, ContentPart, Message};

/// Multi-turn chat that keeps its own history.
///
/// Backs the one-shot generation endpoint and the history tool, which seeds
/// it with the stored thread before replaying the prompt.
pub struct ChatSession<C: GenerationClient + ?Sized = dyn LLMClient> {
    client: Arc<C>,
    model: String,
    options: GenerateOptions,
    history: Vec<Message>,
}

impl<C: GenerationClient + ?Sized> ChatSession<C> {
    pub fn new(client: Arc<C>, model: impl Into<String>, options: GenerateOptions) -> Self {
        Self::with_history(client, model, options, Vec::new())
    }

    /// Start from earlier turns, oldest first
    pub fn with_history(
        client: Arc<C>,
        model: impl Into<String>,
        options: GenerateOptions,
        history: Vec<Message>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            options,
            history,
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Send one user turn and return the reply text.
    /// History only grows when the provider call succeeds.
    pub async fn send_message(&mut self, parts: Vec<ContentPart>) -> Result<String> {
        let user_turn = Message::human(Content::from_parts(parts));

        let mut contents = self.history.clone();
        contents.push(user_turn.clone());

        let request = GenerateRequest::new(self.model.clone(), contents)
            .with_options(self.options.clone());
        let response = self.client.generate(request).await?;
        let reply = response.text.unwrap_or_default();

        self.history.push(user_turn);
        self.history.push(Message::ai(reply.clone()));

        Ok(reply)
    }
}
