use config::{Config as ConfigLoader, ConfigError, File};
use resumate_chat::ChatConfig;
use resumate_llm::PollPolicy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mongodb: MongoDbConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub stream: StreamConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default)]
    pub stack_project_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

impl Default for MongoDbConfig {
    fn default() -> Self {
        Self {
            database: "resumate".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Stored messages the history tool may read
    pub history_limit: usize,
    /// Overrides the Gemini endpoint (proxies, tests)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-lite".to_string(),
            temperature: 0.5,
            max_output_tokens: 512,
            history_limit: 50,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: usize,
    pub poll_initial_ms: u64,
    pub poll_max_ms: u64,
    pub poll_timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            poll_initial_ms: 500,
            poll_max_ms: 5_000,
            poll_timeout_secs: 60,
        }
    }
}

impl UploadConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_millis(self.poll_initial_ms),
            max_delay: Duration::from_millis(self.poll_max_ms),
            timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Defaults to the Stack Auth JWKS of `stack_project_id`
    #[serde(default)]
    pub jwks_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    pub persist_timeout_ms: u64,
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            persist_timeout_ms: 2_000,
            channel_capacity: 64,
        }
    }
}

/// Environment variable → config key
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("CORS_ENABLED", "cors.enabled"),
    ("STORAGE_BACKEND", "storage.backend"),
    ("MONGODB_DATABASE", "mongodb.database"),
    ("LLM_MODEL", "llm.model"),
    ("LLM_TEMPERATURE", "llm.temperature"),
    ("LLM_MAX_OUTPUT_TOKENS", "llm.max_output_tokens"),
    ("LLM_HISTORY_LIMIT", "llm.history_limit"),
    ("LLM_BASE_URL", "llm.base_url"),
    ("UPLOAD_MAX_BYTES", "upload.max_bytes"),
    ("UPLOAD_POLL_TIMEOUT_SECS", "upload.poll_timeout_secs"),
    ("AUTH_ENABLED", "auth.enabled"),
    ("AUTH_JWKS_URL", "auth.jwks_url"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
    ("STREAM_PERSIST_TIMEOUT_MS", "stream.persist_timeout_ms"),
    ("STREAM_CHANNEL_CAPACITY", "stream.channel_capacity"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables listed in `ENV_OVERRIDES`, plus `CORS_ORIGINS` (comma separated)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            builder = builder.set_override("cors.origins", origins)?;
        }

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.gemini_api_key = std::env::var("GOOGLE_GENERATIVE_AI_API_KEY").map_err(|_| {
            ConfigError::Message("GOOGLE_GENERATIVE_AI_API_KEY environment variable is required".to_string())
        })?;

        if cfg.storage.backend == StorageBackend::Mongodb {
            cfg.mongodb_uri = std::env::var("MONGODB_URI").map_err(|_| {
                ConfigError::Message("MONGODB_URI environment variable is required".to_string())
            })?;
        }

        if cfg.auth.enabled {
            cfg.stack_project_id = std::env::var("STACK_PROJECT_ID")
                .or_else(|_| std::env::var("NEXT_PUBLIC_STACK_PROJECT_ID"))
                .map_err(|_| {
                    ConfigError::Message("STACK_PROJECT_ID environment variable is required".to_string())
                })?;
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig::new(self.llm.model.clone())
            .with_temperature(self.llm.temperature)
            .with_max_output_tokens(self.llm.max_output_tokens)
            .with_history_limit(self.llm.history_limit)
            .with_persist_timeout(Duration::from_millis(self.stream.persist_timeout_ms))
            .with_channel_capacity(self.stream.channel_capacity)
    }

    pub fn jwks_url(&self) -> String {
        self.auth.jwks_url.clone().unwrap_or_else(|| {
            format!(
                "https://api.stack-auth.com/api/v1/projects/{}/.well-known/jwks.json",
                self.stack_project_id
            )
        })
    }
}
