// Gemini REST client (HTTP direct, no SDK)

use crate::files::ProviderFile;
use crate::streaming::{parse_generation_stream, GenerateContentChunk};
use crate::traits::{
    ChunkStream, FileClient, FileUpload, GenerateOptions, GenerateRequest, GenerateResponse,
    GenerationClient,
};
use crate::types::{Content, ContentPart, Message};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadEnvelope {
    file: ProviderFile,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    /// Point the client at another host (proxies, test servers)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&api_key).context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    fn build_payload(&self, contents: Vec<Message>, options: &GenerateOptions) -> Result<Value> {
        let contents: Vec<Value> = contents.into_iter().map(convert_message).collect();

        let mut payload = json!({ "contents": contents });
        let Some(obj) = payload.as_object_mut() else {
            anyhow::bail!("payload is not an object");
        };

        if let Some(instruction) = &options.system_instruction {
            obj.insert(
                "systemInstruction".to_string(),
                json!({ "parts": [{ "text": instruction }] }),
            );
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temp) = options.temperature {
            generation_config.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tokens) = options.max_output_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }
        if !generation_config.is_empty() {
            obj.insert("generationConfig".to_string(), Value::Object(generation_config));
        }

        if let Some(tools) = options.tools.as_ref().filter(|t| !t.is_empty()) {
            obj.insert(
                "tools".to_string(),
                json!([{ "functionDeclarations": serde_json::to_value(tools)? }]),
            );
        }

        Ok(payload)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        anyhow::bail!("Gemini API error ({}): {}", status, error_text);
    }
}

fn convert_message(message: Message) -> Value {
    let role = message.role().to_string();
    let parts = match message {
        Message::Human { content } | Message::AI { content } => convert_content(content),
    };

    json!({ "role": role, "parts": parts })
}

fn convert_content(content: Content) -> Vec<Value> {
    content.into_parts().into_iter().map(convert_part).collect()
}

fn convert_part(part: ContentPart) -> Value {
    match part {
        ContentPart::Text { text } => json!({ "text": text }),
        ContentPart::File { file } => json!({
            "fileData": { "mimeType": file.mime_type, "fileUri": file.uri }
        }),
        ContentPart::ImageUrl { image_url } => match split_data_url(&image_url.url) {
            Some((mime_type, data)) => json!({
                "inlineData": { "mimeType": mime_type, "data": data }
            }),
            None => json!({
                "fileData": {
                    "mimeType": image_url.media_type.unwrap_or_else(|| "image/*".to_string()),
                    "fileUri": image_url.url,
                }
            }),
        },
    }
}

/// `data:<mime>;base64,<payload>` into its parts
fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime_type = meta.strip_suffix(";base64")?;
    Some((mime_type, data))
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let payload = self.build_payload(request.contents, &request.options)?;

        let response = self
            .http_client
            .post(self.model_url(&request.model, "generateContent"))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;
        let response = Self::check_status(response).await?;

        let raw: Value = response.json().await.context("Failed to parse response")?;
        let parsed: GenerateContentChunk =
            serde_json::from_value(raw.clone()).context("Unexpected response shape")?;

        Ok(GenerateResponse {
            text: parsed.text(),
            function_calls: parsed.function_calls(),
            usage: parsed.usage(),
            finish_reason: parsed.finish_reason().map(str::to_string),
            raw,
        })
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<ChunkStream> {
        let payload = self.build_payload(request.contents, &request.options)?;

        let response = self
            .http_client
            .post(self.model_url(&request.model, "streamGenerateContent"))
            .query(&[("alt", "sse")])
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;
        let response = Self::check_status(response).await?;

        Ok(parse_generation_stream(response))
    }
}

#[async_trait]
impl FileClient for GeminiClient {
    async fn upload_file(&self, upload: FileUpload) -> Result<ProviderFile> {
        // Resumable protocol: open a session, then send bytes and finalize
        let start = self
            .http_client
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", upload.bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", upload.mime_type.as_str())
            .json(&json!({ "file": { "displayName": upload.display_name } }))
            .send()
            .await
            .context("Failed to start upload")?;
        let start = Self::check_status(start).await?;

        let session_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .context("Upload session URL missing from response")?;

        let finish = self
            .http_client
            .post(session_url)
            .header(CONTENT_TYPE, upload.mime_type.as_str())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(upload.bytes)
            .send()
            .await
            .context("Failed to upload file bytes")?;
        let finish = Self::check_status(finish).await?;

        let envelope: UploadEnvelope = finish
            .json()
            .await
            .context("Failed to parse upload response")?;

        tracing::info!(
            file = %envelope.file.name,
            state = ?envelope.file.state,
            "uploaded file to provider"
        );

        Ok(envelope.file)
    }

    async fn get_file(&self, name: &str) -> Result<ProviderFile> {
        let response = self
            .http_client
            .get(format!("{}/v1beta/{}", self.base_url, name))
            .send()
            .await
            .context("Failed to fetch file")?;
        let response = Self::check_status(response).await?;

        response.json().await.context("Failed to parse file metadata")
    }
}
