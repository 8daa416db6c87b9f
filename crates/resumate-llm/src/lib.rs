pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod gemini;
pub mod files;
pub mod session;
pub mod config;

pub use traits::{
    GenerationClient,
    FileClient,
    LLMClient,
    ChunkStream,
    GenerateRequest, GenerateResponse, GenerateOptions,
    FileUpload, TokenUsage,
};

pub use streaming::StreamChunk;
pub use buffer_utils::CircularLineBuffer;
pub use gemini::GeminiClient;
pub use files::{wait_until_active, PollPolicy, ProviderFile, FileState};
pub use session::ChatSession;
pub use config::{ClientFactory, GeminiConfig};
pub use types::{Message, Content, ContentPart, FileRef, ImageUrl, Tool, FunctionCall};
