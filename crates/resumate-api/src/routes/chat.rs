use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::Response,
    Json,
};
use futures::StreamExt;
use resumate_chat::response_headers;
use resumate_persist::{Sender, StoredMessage};
use resumate_types::ChatRequest;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChatQuery {
    /// Value of the `x-vercel-ai-protocol` header; empty omits it
    pub protocol: Option<String>,
}

/// Stream an assistant reply for the last message of the conversation
///
/// The body is a server-sent event stream of UI message events closed by `data: [DONE]`.
#[utoipa::path(
    post,
    path = "/api/chat",
    params(ChatQuery),
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream"),
        (status = 400, description = "No messages, empty last message or invalid protocol"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ChatQuery>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Response> {
    // Header values are checked before the turn touches the store
    let mut headers = HeaderMap::new();
    for (name, value) in response_headers(query.protocol.as_deref()) {
        let value = HeaderValue::from_str(&value)
            .map_err(|_| ApiError::BadRequest("Invalid protocol".to_string()))?;
        headers.insert(HeaderName::from_static(name), value);
    }

    let turn = state.chat.handle_turn(request).await?;

    tracing::info!(
        thread_id = %turn.thread_id,
        user_id = %user.id,
        route = ?turn.route,
        "streaming chat turn"
    );

    let frames = turn.stream.frames().map(Ok::<_, Infallible>);
    let mut response = Response::new(Body::from_stream(frames));
    *response.headers_mut() = headers;

    Ok(response)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UiMessagePart {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UiMessage {
    pub id: String,
    /// `user` or `assistant`
    pub role: String,
    pub parts: Vec<UiMessagePart>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatHistoryResponse {
    pub messages: Vec<UiMessage>,
}

impl From<StoredMessage> for UiMessage {
    fn from(message: StoredMessage) -> Self {
        let role = match message.sender {
            Sender::User => "user",
            Sender::Model => "assistant",
        };

        Self {
            id: message.id,
            role: role.to_string(),
            parts: vec![UiMessagePart {
                kind: "text".to_string(),
                text: message.content,
            }],
        }
    }
}

/// Stored messages of a thread, oldest first, shaped for the chat UI
#[utoipa::path(
    get,
    path = "/api/chat/history/{thread_id}",
    params(("thread_id" = String, Path, description = "Thread ID")),
    responses(
        (status = 200, description = "Thread history", body = ChatHistoryResponse)
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ChatHistoryResponse>> {
    let messages = state.chat.history(&thread_id).await?;

    Ok(Json(ChatHistoryResponse {
        messages: messages.into_iter().map(UiMessage::from).collect(),
    }))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub response: String,
}

/// One-shot, non-streaming generation
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Generated text", body = GenerateResponse),
        (status = 500, description = "Provider call failed")
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(request): Json<PromptRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let response = state
        .chat
        .generate(&request.prompt)
        .await
        .map_err(|e| ApiError::Generation(e.to_string()))?;

    Ok(Json(GenerateResponse { response }))
}
