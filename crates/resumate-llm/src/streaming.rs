use std::pin::Pin;
use anyhow::Result;
use futures::Stream;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::buffer_utils::{parse_sse_stream, SseLineParser};
use crate::traits::TokenUsage;
use crate::types::FunctionCall;

/// One decoded unit of a streaming generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    Text {
        content: String,
    },

    FunctionCall {
        name: String,
        #[serde(default)]
        args: Value,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

/// `generateContent` / `streamGenerateContent` response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentChunk {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<CandidateContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallPart>,
    /// Thought summaries are never forwarded as answer text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCallPart {
    pub name: String,
    #[serde(default)]
    pub args: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

impl GenerateContentChunk {
    fn answer_parts(&self) -> impl Iterator<Item = &CandidatePart> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|part| !part.thought.unwrap_or(false))
    }

    /// Concatenated answer text, if any
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .answer_parts()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn function_calls(&self) -> Vec<FunctionCall> {
        self.answer_parts()
            .filter_map(|part| part.function_call.as_ref())
            .map(|call| FunctionCall::new(call.name.clone(), call.args.clone().unwrap_or(Value::Null)))
            .collect()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }

    pub fn usage(&self) -> Option<TokenUsage> {
        self.usage_metadata.as_ref().map(|usage| TokenUsage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        })
    }

    /// Expand into stream chunks, preserving part order
    pub fn to_stream_chunks(&self) -> Vec<StreamChunk> {
        let mut chunks = Vec::new();

        for part in self.answer_parts() {
            if let Some(text) = &part.text {
                if !text.is_empty() {
                    chunks.push(StreamChunk::Text {
                        content: text.clone(),
                    });
                }
            }

            if let Some(call) = &part.function_call {
                chunks.push(StreamChunk::FunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone().unwrap_or(Value::Null),
                });
            }
        }

        if let Some(finish_reason) = self.finish_reason() {
            chunks.push(StreamChunk::Done {
                finish_reason: Some(finish_reason.to_string()),
            });
        }

        chunks
    }
}

/// Line parser for `streamGenerateContent?alt=sse`
pub struct GeminiLineParser;

impl SseLineParser for GeminiLineParser {
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamChunk>> {
        let chunk: GenerateContentChunk = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("Failed to parse generation chunk: {}", e))?;
        Ok(chunk.to_stream_chunks())
    }
}

pub fn parse_generation_stream(
    response: Response,
) -> Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>> {
    parse_sse_stream(response.bytes_stream(), GeminiLineParser)
}
