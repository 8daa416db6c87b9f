use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use resumate_persist::StoredMessage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{auth::AuthUser, error::ApiResult, state::AppState};

const MAX_LIMIT: usize = 100;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: String,
    pub thread_id: String,
    /// `user` or `model`
    pub sender: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl From<StoredMessage> for MessageResponse {
    fn from(message: StoredMessage) -> Self {
        Self {
            id: message.id,
            thread_id: message.thread_id,
            sender: message.sender.as_str().to_string(),
            content: message.content,
            sent_at: message.sent_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMessagesQuery {
    /// Maximum number of messages (default 50, capped at 100)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Raw stored messages of a thread, most recent first
#[utoipa::path(
    get,
    path = "/api/messages/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID"),
        ListMessagesQuery
    ),
    responses(
        (status = 200, description = "List of messages", body = [MessageResponse])
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(thread_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let limit = query.limit.min(MAX_LIMIT);
    let messages = state.chat.recent_messages(&thread_id, limit).await?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}
