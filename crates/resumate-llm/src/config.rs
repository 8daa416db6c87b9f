// Configuration layer for creating provider clients

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::gemini::{GeminiClient, GEMINI_API_BASE};
use crate::traits::LLMClient;

/// Connection settings for the Gemini API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Defaults to the public endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(GEMINI_API_BASE)
    }
}

/// Factory for creating LLM clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_client(config: GeminiConfig) -> Result<Arc<dyn LLMClient>> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("Gemini API key is empty");
        }

        let client = GeminiClient::with_base_url(config.api_key.clone(), config.base_url())?;
        Ok(Arc::new(client))
    }
}
