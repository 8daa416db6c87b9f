use std::time::Duration;

use resumate_llm::GenerateOptions;

use crate::prompt::SYSTEM_INSTRUCTION;

/// Generation and streaming settings shared by every turn
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub system_instruction: String,
    /// Upper bound on stored messages the history tool reads
    pub history_limit: usize,
    /// Per-write bound on assistant fragment persistence
    pub persist_timeout: Duration,
    pub channel_capacity: usize,
    pub tools_enabled: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-lite".to_string(),
            temperature: 0.5,
            max_output_tokens: 512,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            history_limit: 50,
            persist_timeout: Duration::from_secs(2),
            channel_capacity: 64,
            tools_enabled: true,
        }
    }
}

impl ChatConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = timeout;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_tools(mut self, enabled: bool) -> Self {
        self.tools_enabled = enabled;
        self
    }

    /// Options for a provider call, without tool declarations
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions::new()
            .system_instruction(self.system_instruction.clone())
            .temperature(self.temperature)
            .max_output_tokens(self.max_output_tokens)
    }
}
