mod common;

use common::ScriptedClient;
use resumate_chat::{AttachmentService, ChatError};
use resumate_llm::{FileState, PollPolicy};
use resumate_persist::{AttachmentKind, InMemoryStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn quick_poll() -> PollPolicy {
    PollPolicy {
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
        timeout: Duration::from_millis(500),
    }
}

#[tokio::test]
async fn test_upload_waits_for_processing_then_stores() {
    let client = Arc::new(ScriptedClient::new().with_processing(3, FileState::Active));
    let store = Arc::new(InMemoryStore::new());
    let uploads = AttachmentService::new(client.clone(), store).with_poll_policy(quick_poll());

    let record = uploads
        .upload(
            AttachmentKind::Resume,
            Some("t1".into()),
            Some("cv.pdf".into()),
            "application/pdf",
            b"%PDF-1.7".to_vec(),
        )
        .await
        .unwrap();

    assert_eq!(client.polls.load(Ordering::SeqCst), 3);
    assert_eq!(record.size_bytes, Some(4096));
    assert_eq!(record.provider_file_uri, "https://files.example/upload-1");

    let fetched = uploads.get(AttachmentKind::Resume, "t1").await.unwrap().unwrap();
    assert_eq!(fetched.file_name, "cv.pdf");
    assert_eq!(fetched.mime_type, "application/pdf");
    assert_eq!(client.uploads.lock().unwrap()[0].display_name, "cv.pdf");
}

#[tokio::test]
async fn test_defaults_for_missing_thread_and_name() {
    let client = Arc::new(ScriptedClient::new());
    let store = Arc::new(InMemoryStore::new());
    let uploads = AttachmentService::new(client, store).with_poll_policy(quick_poll());

    let record = uploads
        .upload(AttachmentKind::JobDescription, None, None, "application/pdf", vec![1, 2, 3])
        .await
        .unwrap();

    assert_eq!(record.file_name, "job_description.pdf");
    assert!(uuid::Uuid::parse_str(&record.thread_id).is_ok());
    assert!(uploads
        .get(AttachmentKind::Resume, &record.thread_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_failed_processing_is_upload_error() {
    let client = Arc::new(ScriptedClient::new().with_processing(1, FileState::Failed));
    let store = Arc::new(InMemoryStore::new());
    let uploads = AttachmentService::new(client, store).with_poll_policy(quick_poll());

    let err = uploads
        .upload(AttachmentKind::Resume, Some("t1".into()), None, "application/pdf", vec![0])
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Upload(ref m) if m.contains("failed")));
    assert!(uploads.get(AttachmentKind::Resume, "t1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_reports_existence() {
    let client = Arc::new(ScriptedClient::new());
    let store = Arc::new(InMemoryStore::new());
    let uploads = AttachmentService::new(client, store).with_poll_policy(quick_poll());

    uploads
        .upload(AttachmentKind::Resume, Some("t1".into()), None, "application/pdf", vec![0])
        .await
        .unwrap();

    assert!(uploads.delete(AttachmentKind::Resume, "t1").await.unwrap());
    assert!(!uploads.delete(AttachmentKind::Resume, "t1").await.unwrap());
}
