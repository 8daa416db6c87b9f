use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    middleware::logging,
    routes::{attachments, chat, health, messages, openapi, users},
    state::AppState,
};

/// Multipart framing on top of the file itself
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.upload.max_bytes + FORM_OVERHEAD_BYTES);

    let upload_routes = Router::new()
        .route("/resume/upload", post(attachments::upload_resume))
        .route("/job-description/upload", post(attachments::upload_job_description))
        .layer(upload_limit);

    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
        // Chat
        .route("/chat", post(chat::handle_chat))
        .route("/chat/history/:thread_id", get(chat::chat_history))
        .route("/generate", post(chat::generate))
        .route("/messages/:thread_id", get(messages::list_messages))
        // Attachments
        .route(
            "/resume/:thread_id",
            get(attachments::get_resume).delete(attachments::delete_resume),
        )
        .route(
            "/job-description/:thread_id",
            get(attachments::get_job_description).delete(attachments::delete_job_description),
        )
        // Users
        .route("/users/register", post(users::register_user))
        .merge(upload_routes);

    // Timeout bounds time to response headers only; streamed bodies run on
    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(Duration::from_secs(300)))
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
