use crate::files::ProviderFile;
use crate::streaming::StreamChunk;
use crate::types::{FunctionCall, Message, Tool};
use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Lazy sequence of provider chunks for one generation call
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Trait for content generation
///
/// Provides both streaming and non-streaming completions.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Non-streaming generation
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Streaming generation
    async fn generate_stream(&self, request: GenerateRequest) -> Result<ChunkStream>;
}

/// Trait for provider-side file storage
#[async_trait]
pub trait FileClient: Send + Sync {
    /// Upload raw bytes. The returned file may still be processing.
    async fn upload_file(&self, upload: FileUpload) -> Result<ProviderFile>;

    /// Fetch current metadata (and processing state) of an uploaded file
    async fn get_file(&self, name: &str) -> Result<ProviderFile>;
}

/// Convenience trait for clients that support both generation and files
pub trait LLMClient: GenerationClient + FileClient {}

impl<T: GenerationClient + FileClient> LLMClient for T {}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Vec<Message>,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, contents: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            contents,
            options: GenerateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub tools: Option<Vec<Tool>>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub text: Option<String>,
    pub function_calls: Vec<FunctionCall>,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub display_name: String,
}

impl FileUpload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}
