use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::{attachments, chat, health, messages, users};

#[derive(OpenApi)]
#[openapi(
    info(title = "Resumate API", description = "Streaming resume coaching backend"),
    paths(
        health::health_check,
        chat::handle_chat,
        chat::chat_history,
        chat::generate,
        messages::list_messages,
        attachments::upload_resume,
        attachments::get_resume,
        attachments::delete_resume,
        attachments::upload_job_description,
        attachments::get_job_description,
        attachments::delete_job_description,
        users::register_user,
    ),
    components(schemas(
        health::HealthResponse,
        chat::ChatHistoryResponse,
        chat::UiMessage,
        chat::UiMessagePart,
        chat::PromptRequest,
        chat::GenerateResponse,
        messages::MessageResponse,
        attachments::FileUploadResponse,
        attachments::FileInfoResponse,
        attachments::UploadForm,
        users::UserRegisterRequest,
        users::UserRegisterResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "chat"),
        (name = "messages"),
        (name = "resume"),
        (name = "job-description"),
        (name = "users"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
