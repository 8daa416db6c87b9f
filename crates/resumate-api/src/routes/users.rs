use axum::{extract::State, Json};
use chrono::Utc;
use resumate_persist::UserProfile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{auth::AuthUser, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRegisterRequest {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub primary_email_verified: bool,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRegisterResponse {
    /// `success` or `error`
    pub status: String,
    pub message: String,
    pub user_id: String,
}

impl UserRegisterResponse {
    fn new(status: &str, message: impl Into<String>, user_id: String) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            user_id,
        }
    }
}

/// Create or refresh the profile of the authenticated user
///
/// Failures are reported in the body with `status = "error"`, not as HTTP errors.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = UserRegisterRequest,
    responses(
        (status = 200, description = "Registration outcome", body = UserRegisterResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<UserRegisterRequest>,
) -> Json<UserRegisterResponse> {
    if user.id != request.id {
        tracing::warn!(token_user = %user.id, body_user = %request.id, "user id mismatch on register");
        return Json(UserRegisterResponse::new(
            "error",
            "User ID mismatch with authentication token",
            request.id,
        ));
    }

    let profile = UserProfile {
        id: request.id.clone(),
        display_name: request.display_name,
        primary_email: request.primary_email,
        primary_email_verified: request.primary_email_verified,
        profile_image_url: request.profile_image_url,
        updated_at: Utc::now(),
    };

    match state.store.upsert_user(profile).await {
        Ok(()) => Json(UserRegisterResponse::new(
            "success",
            "User registered successfully",
            request.id,
        )),
        Err(e) => {
            tracing::error!(user_id = %request.id, error = %e, "failed to upsert user");
            Json(UserRegisterResponse::new(
                "error",
                format!("Error creating or updating user: {}", e),
                request.id,
            ))
        }
    }
}
