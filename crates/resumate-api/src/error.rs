use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use resumate_chat::ChatError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Error uploading file: {0}")]
    Upload(String),

    #[error("Error calling Gemini API: {0}")]
    Generation(String),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("Persistence error: {0}")]
    Persist(#[from] resumate_persist::PersistError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unauthorized(_) => {
                let body = Json(json!({ "error": self.to_string() }));
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    body,
                )
                    .into_response();
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ApiError::Upload(_) | ApiError::Generation(_) => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ApiError::Chat(ref e) => match e {
                ChatError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                ChatError::Upload(msg) => {
                    tracing::error!("Upload error: {}", msg);
                    (StatusCode::INTERNAL_SERVER_ERROR, format!("Error uploading file: {}", msg))
                }
                ChatError::Store(e) => {
                    tracing::error!("Storage error: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
                }
                ChatError::Provider(e) => {
                    tracing::error!("Provider error: {:#}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
                }
                ChatError::UnknownTool(_) => {
                    tracing::error!("{}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
            },
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ApiError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
