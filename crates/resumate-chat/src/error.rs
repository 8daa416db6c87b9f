use resumate_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// Turn rejected before anything was persisted
    #[error("{0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] PersistError),

    #[error("Provider error: {0}")]
    Provider(#[from] anyhow::Error),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Upload failed: {0}")]
    Upload(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;
