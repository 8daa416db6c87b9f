pub mod content;
pub mod message;
pub mod tool;

pub use content::{Content, ContentPart, FileRef, ImageUrl};
pub use message::Message;
pub use tool::{FunctionCall, Tool};
