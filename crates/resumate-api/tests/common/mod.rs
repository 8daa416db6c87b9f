#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use futures::StreamExt;
use resumate_api::auth::{DisabledAuth, TokenVerifier};
use resumate_api::config::Config;
use resumate_api::{build_router, AppState};
use resumate_llm::{
    ChunkStream, FileClient, FileState, FileUpload, GenerateRequest, GenerateResponse,
    GenerationClient, ProviderFile, StreamChunk,
};
use resumate_persist::InMemoryStore;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Provider fake: fixed stream chunks, fixed reply, files always active
#[derive(Default)]
pub struct FakeProvider {
    pub chunks: Vec<String>,
    pub fail: Option<String>,
    pub uploads: Mutex<Vec<FileUpload>>,
}

impl FakeProvider {
    pub fn streaming(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail: Some(message.to_string()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl GenerationClient for FakeProvider {
    async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse> {
        if let Some(message) = &self.fail {
            anyhow::bail!("{}", message);
        }
        Ok(GenerateResponse {
            text: Some(self.chunks.concat()),
            function_calls: vec![],
            usage: None,
            finish_reason: Some("STOP".into()),
            raw: serde_json::Value::Null,
        })
    }

    async fn generate_stream(&self, _request: GenerateRequest) -> Result<ChunkStream> {
        if let Some(message) = &self.fail {
            anyhow::bail!("{}", message);
        }
        let chunks: Vec<Result<StreamChunk>> = self
            .chunks
            .iter()
            .map(|c| Ok(StreamChunk::Text { content: c.clone() }))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}

#[async_trait]
impl FileClient for FakeProvider {
    async fn upload_file(&self, upload: FileUpload) -> Result<ProviderFile> {
        if let Some(message) = &self.fail {
            anyhow::bail!("{}", message);
        }
        let file = ProviderFile {
            name: "files/f1".into(),
            display_name: Some(upload.display_name.clone()),
            mime_type: upload.mime_type.clone(),
            size_bytes: Some(upload.bytes.len().to_string()),
            uri: "https://files.example/f1".into(),
            state: FileState::Active,
        };
        self.uploads.lock().unwrap().push(upload);
        Ok(file)
    }

    async fn get_file(&self, _name: &str) -> Result<ProviderFile> {
        anyhow::bail!("files are born active in this fake")
    }
}

pub struct TestApp {
    pub router: axum::Router,
    pub store: Arc<InMemoryStore>,
    pub provider: Arc<FakeProvider>,
}

pub fn app_with(provider: FakeProvider, config: Config, auth: Arc<dyn TokenVerifier>) -> TestApp {
    let provider = Arc::new(provider);
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(config, provider.clone(), store.clone(), auth).unwrap();

    TestApp {
        router: build_router(Arc::new(state)),
        store,
        provider,
    }
}

pub fn app(provider: FakeProvider) -> TestApp {
    app_with(provider, Config::default(), Arc::new(DisabledAuth))
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer user-1")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer user-1")
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer user-1")
        .body(Body::empty())
        .unwrap()
}

const BOUNDARY: &str = "resumate-test-boundary";

/// `multipart/form-data` upload with a `file` field and optional `uuid`
pub fn upload_request(uri: &str, file_name: &str, content_type: &str, bytes: &[u8], uuid: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(uuid) = uuid {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"uuid\"\r\n\r\n{uuid}\r\n").as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .header(header::AUTHORIZATION, "Bearer user-1")
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
