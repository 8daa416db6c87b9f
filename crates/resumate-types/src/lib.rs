pub mod events;
pub mod turn;

pub use events::{StreamEvent, TEXT_BLOCK_ID};
pub use turn::{
    ChatRequest, ClientAttachment, ClientMessage, ClientMessagePart, ToolInvocation,
    ToolInvocationState,
};
