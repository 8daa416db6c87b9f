#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use resumate_llm::{
    ChunkStream, FileClient, FileState, FileUpload, GenerateRequest, GenerateResponse,
    GenerationClient, ProviderFile, StreamChunk,
};
use resumate_persist::{AttachmentKind, AttachmentRecord, ConversationStore, InMemoryStore};
use resumate_types::StreamEvent;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the next `generate_stream` call does
pub enum StreamScript {
    Chunks(Vec<StreamChunk>),
    /// Chunks, then an error item
    FailAfter(Vec<StreamChunk>, String),
    /// The call itself fails
    FailOpen(String),
    /// Text forever; counts pulled chunks
    Endless,
    /// Chunks, then never another item; sets `released` once dropped
    Stall(Vec<StreamChunk>),
}

/// Flips a flag when the owning stream is dropped
struct ReleaseGuard(Arc<AtomicBool>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// In-process provider fake
pub struct ScriptedClient {
    streams: Mutex<VecDeque<StreamScript>>,
    replies: Mutex<VecDeque<String>>,
    pub stream_requests: Mutex<Vec<GenerateRequest>>,
    pub generate_requests: Mutex<Vec<GenerateRequest>>,
    pub pulled: Arc<AtomicUsize>,
    pub released: Arc<AtomicBool>,
    /// get_file calls answered PROCESSING before the final state
    processing_polls: usize,
    final_state: FileState,
    pub polls: AtomicUsize,
    pub uploads: Mutex<Vec<FileUpload>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            streams: Mutex::new(VecDeque::new()),
            replies: Mutex::new(VecDeque::new()),
            stream_requests: Mutex::new(Vec::new()),
            generate_requests: Mutex::new(Vec::new()),
            pulled: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicBool::new(false)),
            processing_polls: 0,
            final_state: FileState::Active,
            polls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_stream(self, script: StreamScript) -> Self {
        self.streams.lock().unwrap().push_back(script);
        self
    }

    pub fn with_reply(self, reply: &str) -> Self {
        self.replies.lock().unwrap().push_back(reply.to_string());
        self
    }

    pub fn with_processing(mut self, polls: usize, final_state: FileState) -> Self {
        self.processing_polls = polls;
        self.final_state = final_state;
        self
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_requests.lock().unwrap().len()
    }

    fn provider_file(&self, state: FileState) -> ProviderFile {
        let display_name = self
            .uploads
            .lock()
            .unwrap()
            .last()
            .map(|u| u.display_name.clone());
        ProviderFile {
            name: "files/upload-1".to_string(),
            display_name,
            mime_type: "application/pdf".to_string(),
            size_bytes: Some("4096".to_string()),
            uri: "https://files.example/upload-1".to_string(),
            state,
        }
    }
}

pub fn text(content: &str) -> StreamChunk {
    StreamChunk::Text {
        content: content.to_string(),
    }
}

pub fn call(name: &str) -> StreamChunk {
    StreamChunk::FunctionCall {
        name: name.to_string(),
        args: serde_json::json!({}),
    }
}

pub fn done() -> StreamChunk {
    StreamChunk::Done {
        finish_reason: Some("STOP".to_string()),
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        self.generate_requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "ok".to_string());

        Ok(GenerateResponse {
            text: Some(reply),
            function_calls: vec![],
            usage: None,
            finish_reason: Some("STOP".to_string()),
            raw: serde_json::Value::Null,
        })
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<ChunkStream> {
        self.stream_requests.lock().unwrap().push(request);
        let script = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StreamScript::Chunks(vec![]));

        let pulled = Arc::clone(&self.pulled);
        match script {
            StreamScript::Chunks(chunks) => Ok(futures::stream::iter(chunks.into_iter().map(Ok)).boxed()),
            StreamScript::FailAfter(chunks, message) => {
                let items: Vec<Result<StreamChunk>> = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(anyhow::anyhow!(message))))
                    .collect();
                Ok(futures::stream::iter(items).boxed())
            }
            StreamScript::FailOpen(message) => Err(anyhow::anyhow!(message)),
            StreamScript::Endless => Ok(futures::stream::repeat_with(move || {
                pulled.fetch_add(1, Ordering::SeqCst);
                Ok(text("more "))
            })
            .boxed()),
            StreamScript::Stall(chunks) => {
                let guard = ReleaseGuard(Arc::clone(&self.released));
                Ok(futures::stream::iter(chunks.into_iter().map(Ok))
                    .chain(futures::stream::pending())
                    .inspect(move |_| {
                        let _held = &guard;
                    })
                    .boxed())
            }
        }
    }
}

#[async_trait]
impl FileClient for ScriptedClient {
    async fn upload_file(&self, upload: FileUpload) -> Result<ProviderFile> {
        self.uploads.lock().unwrap().push(upload);
        let state = if self.processing_polls > 0 {
            FileState::Processing
        } else {
            self.final_state
        };
        Ok(self.provider_file(state))
    }

    async fn get_file(&self, _name: &str) -> Result<ProviderFile> {
        let seen = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        let state = if seen < self.processing_polls {
            FileState::Processing
        } else {
            self.final_state
        };
        Ok(self.provider_file(state))
    }
}

pub async fn attach(store: &InMemoryStore, kind: AttachmentKind, thread_id: &str, uri: &str) {
    store
        .upsert_attachment(AttachmentRecord::new(
            kind,
            thread_id,
            kind.default_file_name(),
            "files/x",
            uri,
            "application/pdf",
        ))
        .await
        .unwrap();
}

pub fn kinds(events: &[StreamEvent]) -> Vec<&'static str> {
    events.iter().map(StreamEvent::kind).collect()
}

pub fn deltas(events: &[StreamEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::TextDelta { delta, .. } => Some(delta.clone()),
            _ => None,
        })
        .collect()
}
