mod common;

use axum::http::StatusCode;
use common::*;
use resumate_api::auth::DisabledAuth;
use resumate_api::config::Config;
use resumate_persist::{AttachmentKind, AttachmentRecord, ConversationStore, ListOrder, Sender};
use serde_json::json;
use std::sync::Arc;

async fn with_resume(app: &TestApp, thread_id: &str) {
    app.store
        .upsert_attachment(AttachmentRecord::new(
            AttachmentKind::Resume,
            thread_id,
            "resume.pdf",
            "files/r1",
            "https://files.example/r1",
            "application/pdf",
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_health() {
    let app = app(FakeProvider::default());
    let response = app.send(get("/api/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["storage"], "connected");
}

#[tokio::test]
async fn test_chat_without_resume_streams_upload_request() {
    let app = app(FakeProvider::default());
    let response = app
        .send(json_request(
            "POST",
            "/api/chat",
            json!({"messages": [{"role": "user", "content": "Hello"}], "id": "t1"}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["content-type"], "text/event-stream");
    assert_eq!(headers["x-vercel-ai-ui-message-stream"], "v1");
    assert_eq!(headers["cache-control"], "no-cache");
    assert_eq!(headers["x-accel-buffering"], "no");
    assert_eq!(headers["x-vercel-ai-protocol"], "data");

    let body = body_text(response).await;
    let frames: Vec<&str> = body.split_inclusive("\n\n").collect();
    assert_eq!(frames.len(), 6);
    assert!(frames[0].starts_with("data: {\"type\":\"start\",\"messageId\":\"msg-"));
    assert_eq!(frames[1], "data: {\"type\":\"text-start\",\"id\":\"text-1\"}\n\n");
    assert!(frames[2].contains("please upload your resume"));
    assert_eq!(frames[3], "data: {\"type\":\"text-end\",\"id\":\"text-1\"}\n\n");
    assert_eq!(frames[4], "data: {\"type\":\"finish\"}\n\n");
    assert_eq!(frames[5], "data: [DONE]\n\n");
}

#[tokio::test]
async fn test_chat_with_resume_persists_turn() {
    let app = app(FakeProvider::streaming(&["Lead with ", "results."]));
    with_resume(&app, "t1").await;

    let response = app
        .send(json_request(
            "POST",
            "/api/chat?protocol=text",
            json!({"id": "t1", "messages": [{"role": "user", "parts": [{"type": "text", "text": "Improve my summary"}]}]}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-vercel-ai-protocol"], "text");
    let body = body_text(response).await;
    assert!(body.contains("\"delta\":\"Lead with \""));
    assert!(body.ends_with("data: [DONE]\n\n"));

    let stored = app.store.list_messages("t1", None, ListOrder::Chronological).await.unwrap();
    assert_eq!(stored[0].sender, Sender::User);
    assert_eq!(stored[0].content, "Improve my summary");
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn test_empty_protocol_omits_header() {
    let app = app(FakeProvider::default());
    let response = app
        .send(json_request(
            "POST",
            "/api/chat?protocol=",
            json!({"messages": [{"role": "user", "content": "Hello"}]}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-vercel-ai-protocol").is_none());
}

#[tokio::test]
async fn test_invalid_protocol_is_rejected_before_anything_is_stored() {
    let app = app(FakeProvider::streaming(&["unused"]));

    let response = app
        .send(json_request(
            "POST",
            "/api/chat?protocol=a%0Ab",
            json!({"messages": [{"role": "user", "content": "Hello"}], "id": "t1"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid protocol");

    with_resume(&app, "t1").await;
    let response = app
        .send(json_request(
            "POST",
            "/api/chat?protocol=a%0Ab",
            json!({"messages": [{"role": "user", "content": "Hello"}], "id": "t1"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stored = app
        .store
        .list_messages("t1", None, ListOrder::Chronological)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_chat_validation_errors() {
    let app = app(FakeProvider::default());

    let response = app.send(json_request("POST", "/api/chat", json!({"messages": []}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No messages provided");

    let response = app
        .send(json_request(
            "POST",
            "/api/chat",
            json!({"messages": [{"role": "user", "content": ""}]}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No message content found");
}

#[tokio::test]
async fn test_provider_failure_before_stream_is_500() {
    let app = app(FakeProvider::failing("Gemini API error (503): overloaded"));
    with_resume(&app, "t1").await;

    let response = app
        .send(json_request(
            "POST",
            "/api/chat",
            json!({"id": "t1", "messages": [{"role": "user", "content": "Hi"}]}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"].as_str().unwrap().contains("overloaded"));
}

#[tokio::test]
async fn test_history_and_messages_listing() {
    let app = app(FakeProvider::default());
    app.store.append_message("t1", Sender::User, "one").await.unwrap();
    app.store.append_message("t1", Sender::Model, "two").await.unwrap();
    app.store.append_message("t1", Sender::User, "three").await.unwrap();

    let history = body_json(app.send(get("/api/chat/history/t1")).await).await;
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["parts"][0]["type"], "text");
    assert_eq!(messages[0]["parts"][0]["text"], "one");
    assert_eq!(messages[1]["role"], "assistant");

    let listed = body_json(app.send(get("/api/messages/t1?limit=2")).await).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["content"], "three");
    assert_eq!(listed[1]["sender"], "model");
}

#[tokio::test]
async fn test_resume_upload_get_delete() {
    let app = app(FakeProvider::default());

    let response = app
        .send(upload_request("/api/resume/upload", "cv.pdf", "application/pdf", b"%PDF-1.7", Some("t1")))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Resume uploaded successfully!");

    let info = body_json(app.send(get("/api/resume/t1")).await).await;
    assert_eq!(info, json!({"name": "cv.pdf", "contentType": "application/pdf"}));

    let record = app.store.get_attachment(AttachmentKind::Resume, "t1").await.unwrap().unwrap();
    assert_eq!(record.size_bytes, Some(8));

    let response = app.send(delete("/api/resume/t1")).await;
    assert_eq!(body_json(response).await["message"], "Resume deleted successfully!");

    let response = app.send(get("/api/resume/t1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Resume not found");
}

#[tokio::test]
async fn test_job_description_is_independent_of_resume() {
    let app = app(FakeProvider::default());

    let response = app
        .send(upload_request("/api/job-description/upload", "jd.pdf", "application/pdf", b"role", Some("t1")))
        .await;
    assert_eq!(body_json(response).await["message"], "Job description uploaded successfully!");

    assert_eq!(app.send(get("/api/job-description/t1")).await.status(), StatusCode::OK);
    let response = app.send(get("/api/resume/t1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_limits_and_missing_file() {
    let mut config = Config::default();
    config.upload.max_bytes = 16;
    let app = app_with(FakeProvider::default(), config, Arc::new(DisabledAuth));

    let response = app
        .send(upload_request("/api/resume/upload", "big.pdf", "application/pdf", &[0u8; 64], Some("t1")))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let response = app
        .send(json_request("POST", "/api/resume/upload", json!({})))
        .await;
    assert!(response.status().is_client_error());
    assert!(app.provider.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_provider_failure_is_500() {
    let app = app(FakeProvider::failing("quota"));
    let response = app
        .send(upload_request("/api/resume/upload", "cv.pdf", "application/pdf", b"x", Some("t1")))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Error uploading file:"));
}

#[tokio::test]
async fn test_register_user() {
    let app = app(FakeProvider::default());

    let response = app
        .send(json_request(
            "POST",
            "/api/users/register",
            json!({"id": "user-2", "displayName": "Someone Else"}),
        ))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "User ID mismatch with authentication token");

    let response = app
        .send(json_request(
            "POST",
            "/api/users/register",
            json!({"id": "user-1", "displayName": "Sam", "primaryEmail": "sam@example.com", "primaryEmailVerified": true}),
        ))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["user_id"], "user-1");

    let user = app.store.user("user-1").await.unwrap();
    assert_eq!(user.primary_email.as_deref(), Some("sam@example.com"));
    assert!(user.primary_email_verified);
}

#[tokio::test]
async fn test_generate() {
    let app = app(FakeProvider::streaming(&["Short ", "answer"]));
    let response = app
        .send(json_request("POST", "/api/generate", json!({"prompt": "Summarize"})))
        .await;
    assert_eq!(body_json(response).await, json!({"response": "Short answer"}));

    let app = common::app(FakeProvider::failing("bad key"));
    let response = app
        .send(json_request("POST", "/api/generate", json!({"prompt": "Summarize"})))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Error calling Gemini API:"));
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = app(FakeProvider::default());
    let doc = body_json(app.send(get("/api/openapi.json")).await).await;

    assert!(doc["paths"].get("/api/chat").is_some());
    assert!(doc["paths"].get("/api/resume/{thread_id}").is_some());
    assert!(doc["components"]["securitySchemes"].get("bearer").is_some());
}
