use futures::{Stream, StreamExt};
use resumate_llm::{
    ChunkStream, Content, ContentPart, FileRef, GenerateRequest, LLMClient, Message, StreamChunk,
};
use resumate_persist::{ConversationStore, Sender};
use resumate_types::StreamEvent;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ChatConfig;
use crate::encoder::encode_frame;
use crate::error::{ChatError, Result};
use crate::tools::{ToolContext, ToolRegistry};

/// One generation turn, already normalized
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub thread_id: String,
    /// Plain prompt text, handed to tools
    pub prompt: String,
    pub content: Content,
    /// Provider files sent ahead of the content (resume, job description)
    pub attachments: Vec<FileRef>,
}

/// Counters reported when a turn finishes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnSummary {
    pub deltas: usize,
    pub persisted: usize,
    pub tool_calls: usize,
    /// Receiver went away before the provider stream was exhausted
    pub cancelled: bool,
}

/// Live event stream of a turn plus a handle to its final outcome.
///
/// Dropping the stream disconnects the turn: the task stops waiting on the
/// provider (or a running tool) and drops the provider stream.
pub struct TurnStream {
    events: mpsc::Receiver<StreamEvent>,
    outcome: JoinHandle<Result<TurnSummary>>,
}

impl TurnStream {
    pub fn into_parts(self) -> (mpsc::Receiver<StreamEvent>, JoinHandle<Result<TurnSummary>>) {
        (self.events, self.outcome)
    }

    /// Encoded SSE frames, ending with the `[DONE]` frame
    pub fn frames(self) -> impl Stream<Item = String> + Send + 'static {
        self.filter_map(|event| async move {
            match encode_frame(&event) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    tracing::error!(kind = event.kind(), error = %e, "failed to encode stream event");
                    None
                }
            }
        })
    }

    /// Drain every event, then wait for the outcome
    pub async fn collect_all(mut self) -> (Vec<StreamEvent>, Result<TurnSummary>) {
        let mut events = Vec::new();
        while let Some(event) = self.events.recv().await {
            events.push(event);
        }

        let outcome = match self.outcome.await {
            Ok(outcome) => outcome,
            Err(e) => Err(ChatError::Provider(anyhow::anyhow!("turn task aborted: {}", e))),
        };
        (events, outcome)
    }
}

impl Stream for TurnStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

/// Relays a provider chunk stream into protocol events
#[derive(Clone)]
pub struct GenerationDriver {
    client: Arc<dyn LLMClient>,
    store: Arc<dyn ConversationStore>,
    tools: Arc<ToolRegistry>,
    config: ChatConfig,
}

impl GenerationDriver {
    pub fn new(
        client: Arc<dyn LLMClient>,
        store: Arc<dyn ConversationStore>,
        tools: Arc<ToolRegistry>,
        config: ChatConfig,
    ) -> Self {
        Self {
            client,
            store,
            tools,
            config,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<dyn LLMClient> {
        &self.client
    }

    /// Provider request for a turn: files first, then the normalized content
    pub fn build_request(&self, request: &TurnRequest) -> GenerateRequest {
        let mut parts: Vec<ContentPart> = request
            .attachments
            .iter()
            .cloned()
            .map(ContentPart::file)
            .collect();
        parts.extend(request.content.clone().into_parts());

        let mut options = self.config.generate_options();
        if self.config.tools_enabled && !self.tools.is_empty() {
            options = options.tools(self.tools.declarations());
        }

        GenerateRequest::new(
            self.config.model.clone(),
            vec![Message::human(Content::from_parts(parts))],
        )
        .with_options(options)
    }

    /// Open the provider stream and start relaying it.
    ///
    /// Failing to open the stream is returned here, before any event exists.
    pub async fn stream(&self, request: TurnRequest) -> Result<TurnStream> {
        let provider_request = self.build_request(&request);

        tracing::info!(
            thread_id = %request.thread_id,
            model = %provider_request.model,
            attachments = request.attachments.len(),
            "opening generation stream"
        );

        let chunks = self.client.generate_stream(provider_request).await?;

        Ok(self.relay(
            ToolContext {
                thread_id: request.thread_id,
                prompt: request.prompt,
                attachments: request.attachments,
            },
            chunks,
        ))
    }

    /// Stream fixed assistant text through the same emit and persist path
    pub fn stream_text(&self, thread_id: &str, text: &str) -> TurnStream {
        let chunks: ChunkStream = Box::pin(futures::stream::iter(vec![Ok(StreamChunk::Text {
            content: text.to_string(),
        })]));

        self.relay(
            ToolContext {
                thread_id: thread_id.to_string(),
                prompt: String::new(),
                attachments: Vec::new(),
            },
            chunks,
        )
    }

    fn relay(&self, ctx: ToolContext, chunks: ChunkStream) -> TurnStream {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));

        let task = RelayTask {
            store: Arc::clone(&self.store),
            tools: Arc::clone(&self.tools),
            persist_timeout: self.config.persist_timeout,
            ctx,
        };
        let outcome = tokio::spawn(task.run(chunks, tx));

        TurnStream {
            events: rx,
            outcome,
        }
    }
}

/// Tracks the text block and whether anyone is still listening
struct Emitter {
    tx: mpsc::Sender<StreamEvent>,
    text_open: bool,
    connected: bool,
}

impl Emitter {
    fn new(tx: mpsc::Sender<StreamEvent>) -> Self {
        Self {
            tx,
            text_open: false,
            connected: true,
        }
    }

    async fn emit(&mut self, event: StreamEvent) {
        if self.connected && self.tx.send(event).await.is_err() {
            self.connected = false;
        }
    }

    async fn text(&mut self, delta: String) {
        if !self.text_open {
            self.emit(StreamEvent::text_start()).await;
            self.text_open = true;
        }
        self.emit(StreamEvent::text_delta(delta)).await;
    }

    /// `text-end` when a block is open, then `finish` and the terminator
    async fn close(&mut self) {
        if self.text_open {
            self.emit(StreamEvent::text_end()).await;
            self.text_open = false;
        }
        self.emit(StreamEvent::Finish).await;
        self.emit(StreamEvent::Terminator).await;
    }
}

struct RelayTask {
    store: Arc<dyn ConversationStore>,
    tools: Arc<ToolRegistry>,
    persist_timeout: Duration,
    ctx: ToolContext,
}

impl RelayTask {
    async fn run(self, chunks: ChunkStream, tx: mpsc::Sender<StreamEvent>) -> Result<TurnSummary> {
        let mut emitter = Emitter::new(tx);
        let mut summary = TurnSummary::default();

        emitter.emit(StreamEvent::start()).await;
        let result = self.pump(chunks, &mut emitter, &mut summary).await;
        emitter.close().await;
        summary.cancelled = !emitter.connected;

        match result {
            Ok(()) => {
                tracing::info!(
                    thread_id = %self.ctx.thread_id,
                    deltas = summary.deltas,
                    persisted = summary.persisted,
                    tool_calls = summary.tool_calls,
                    cancelled = summary.cancelled,
                    "turn completed"
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(
                    thread_id = %self.ctx.thread_id,
                    deltas = summary.deltas,
                    error = %e,
                    "turn failed after streaming started"
                );
                Err(e)
            }
        }
    }

    async fn pump(
        &self,
        mut chunks: ChunkStream,
        emitter: &mut Emitter,
        summary: &mut TurnSummary,
    ) -> Result<()> {
        // Resolves as soon as the receiver is dropped, even while the provider is silent
        let watch = emitter.tx.clone();

        while emitter.connected {
            let chunk = tokio::select! {
                biased;
                _ = watch.closed() => {
                    emitter.connected = false;
                    break;
                }
                chunk = chunks.next() => chunk,
            };
            let Some(chunk) = chunk else {
                break;
            };

            match chunk? {
                StreamChunk::Text { content } => {
                    self.deliver(content, emitter, summary).await;
                }
                StreamChunk::FunctionCall { name, args } => {
                    summary.tool_calls += 1;
                    tracing::info!(thread_id = %self.ctx.thread_id, tool = %name, "model requested tool");

                    let text = tokio::select! {
                        biased;
                        _ = watch.closed() => {
                            emitter.connected = false;
                            break;
                        }
                        text = self.tools.dispatch(&name, &args, &self.ctx) => text?,
                    };
                    self.deliver(text, emitter, summary).await;
                }
                StreamChunk::Done { finish_reason } => {
                    tracing::debug!(thread_id = %self.ctx.thread_id, ?finish_reason, "provider finished");
                }
            }
        }

        if !emitter.connected {
            tracing::info!(thread_id = %self.ctx.thread_id, "client disconnected, dropping provider stream");
        }
        Ok(())
    }

    /// Persist then emit one non-empty fragment
    async fn deliver(&self, text: String, emitter: &mut Emitter, summary: &mut TurnSummary) {
        if text.is_empty() {
            return;
        }

        self.persist(&text, summary).await;
        emitter.text(text).await;
        summary.deltas += 1;
    }

    async fn persist(&self, text: &str, summary: &mut TurnSummary) {
        let write = self
            .store
            .append_message(&self.ctx.thread_id, Sender::Model, text);

        match tokio::time::timeout(self.persist_timeout, write).await {
            Ok(Ok(_)) => summary.persisted += 1,
            Ok(Err(e)) => {
                tracing::error!(thread_id = %self.ctx.thread_id, error = %e, "failed to persist assistant fragment");
            }
            Err(_) => {
                tracing::warn!(
                    thread_id = %self.ctx.thread_id,
                    timeout_ms = self.persist_timeout.as_millis() as u64,
                    "assistant fragment persistence timed out"
                );
            }
        }
    }
}
