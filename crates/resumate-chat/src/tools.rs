use anyhow::Result;
use async_trait::async_trait;
use resumate_llm::{ChatSession, ContentPart, FileRef, LLMClient, Message, Tool};
use resumate_persist::{ConversationStore, ListOrder, Sender, StoredMessage};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ChatConfig;
use crate::error::ChatError;

pub const MESSAGE_HISTORY_TOOL: &str = "get_message_history";

/// What a tool sees of the turn that invoked it
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub thread_id: String,
    pub prompt: String,
    pub attachments: Vec<FileRef>,
}

/// A locally executed function the model may call
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn declaration(&self) -> Tool;

    /// Returns text that is streamed to the client as if the model wrote it
    async fn invoke(&self, ctx: &ToolContext, args: &Value) -> Result<String>;
}

/// Name → handler. Closed set: anything not registered is an error.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.declaration().name;
        self.handlers.insert(name, handler);
    }

    pub fn with(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Declarations sorted by name so requests are stable
    pub fn declarations(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.handlers.values().map(|h| h.declaration()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Resolve and run a tool call
    pub async fn dispatch(
        &self,
        name: &str,
        args: &Value,
        ctx: &ToolContext,
    ) -> std::result::Result<String, ChatError> {
        let handler = self
            .get(name)
            .ok_or_else(|| ChatError::UnknownTool(name.to_string()))?;

        let started = std::time::Instant::now();
        let result = handler.invoke(ctx, args).await;

        tracing::info!(
            tool = name,
            thread_id = %ctx.thread_id,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "tool executed"
        );

        result.map_err(ChatError::Provider)
    }
}

/// Answers the prompt again with the thread's earlier messages as context.
///
/// Runs a nested, tool-less chat session, so it never recurses.
pub struct MessageHistoryTool {
    store: Arc<dyn ConversationStore>,
    client: Arc<dyn LLMClient>,
    config: ChatConfig,
}

impl MessageHistoryTool {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        client: Arc<dyn LLMClient>,
        config: ChatConfig,
    ) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    /// Earlier turns oldest first, excluding the turn in progress
    async fn prior_history(&self, thread_id: &str) -> Result<Vec<Message>> {
        let recent = self
            .store
            .list_messages(thread_id, Some(self.config.history_limit), ListOrder::RecentFirst)
            .await?;

        Ok(merge_turns(without_current_turn(recent)))
    }
}

/// Drop the newest user message and anything stored after it, then restore
/// chronological order.
fn without_current_turn(mut recent_first: Vec<StoredMessage>) -> Vec<StoredMessage> {
    if let Some(idx) = recent_first.iter().position(|m| m.sender == Sender::User) {
        recent_first.drain(..=idx);
    }
    recent_first.reverse();
    recent_first
}

/// Collapse consecutive entries from the same sender into one turn.
/// Model fragments are rejoined as streamed; separate user messages get a blank line.
fn merge_turns(messages: Vec<StoredMessage>) -> Vec<Message> {
    let mut turns: Vec<(Sender, String)> = Vec::new();

    for message in messages {
        match turns.last_mut() {
            Some((sender, text)) if *sender == message.sender => {
                if message.sender == Sender::User {
                    text.push_str("\n\n");
                }
                text.push_str(&message.content);
            }
            _ => turns.push((message.sender, message.content)),
        }
    }

    turns
        .into_iter()
        .map(|(sender, text)| match sender {
            Sender::User => Message::human(text),
            Sender::Model => Message::ai(text),
        })
        .collect()
}

#[async_trait]
impl ToolHandler for MessageHistoryTool {
    fn declaration(&self) -> Tool {
        Tool::new(
            MESSAGE_HISTORY_TOOL,
            "Retrieve the earlier messages of this conversation. Call it when the user refers to something said before.",
        )
    }

    async fn invoke(&self, ctx: &ToolContext, _args: &Value) -> Result<String> {
        let history = self.prior_history(&ctx.thread_id).await?;
        tracing::debug!(thread_id = %ctx.thread_id, turns = history.len(), "replaying history");

        let mut session = ChatSession::with_history(
            Arc::clone(&self.client),
            self.config.model.clone(),
            self.config.generate_options(),
            history,
        );

        let mut parts: Vec<ContentPart> = ctx.attachments.iter().cloned().map(ContentPart::file).collect();
        parts.push(ContentPart::text(ctx.prompt.clone()));

        session.send_message(parts).await
    }
}
