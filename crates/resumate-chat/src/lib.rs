pub mod builder;
pub mod config;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod orchestrator;
pub mod prompt;
pub mod tools;
pub mod uploads;

pub use builder::OrchestratorBuilder;
pub use config::ChatConfig;
pub use driver::{GenerationDriver, TurnRequest, TurnStream, TurnSummary};
pub use encoder::{encode_frame, response_headers, DONE_FRAME};
pub use error::{ChatError, Result};
pub use normalizer::{content_blocks, normalize, prompt_text, TurnShape};
pub use orchestrator::{ConversationOrchestrator, Turn, TurnRoute};
pub use tools::{MessageHistoryTool, ToolContext, ToolHandler, ToolRegistry, MESSAGE_HISTORY_TOOL};
pub use uploads::AttachmentService;

// Re-export the event type so callers need not depend on resumate-types directly
pub use resumate_types::StreamEvent;
