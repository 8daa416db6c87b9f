use anyhow::{anyhow, Result};
use std::sync::Arc;

use resumate_llm::LLMClient;
use resumate_persist::ConversationStore;

use crate::config::ChatConfig;
use crate::driver::GenerationDriver;
use crate::orchestrator::ConversationOrchestrator;
use crate::tools::{MessageHistoryTool, ToolHandler, ToolRegistry};

/// Builder for a [`ConversationOrchestrator`].
///
/// The history tool is always registered; extra handlers can be added.
pub struct OrchestratorBuilder {
    client: Option<Arc<dyn LLMClient>>,
    store: Option<Arc<dyn ConversationStore>>,
    config: ChatConfig,
    extra_tools: Vec<Arc<dyn ToolHandler>>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            store: None,
            config: ChatConfig::default(),
            extra_tools: Vec::new(),
        }
    }

    /// Set the provider client
    pub fn client(mut self, client: Arc<dyn LLMClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the conversation store
    pub fn store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tool(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.extra_tools.push(handler);
        self
    }

    pub fn build(self) -> Result<ConversationOrchestrator> {
        let client = self
            .client
            .ok_or_else(|| anyhow!("LLM client is required"))?;
        let store = self
            .store
            .ok_or_else(|| anyhow!("Conversation store is required"))?;

        let mut registry = ToolRegistry::new().with(Arc::new(MessageHistoryTool::new(
            Arc::clone(&store),
            Arc::clone(&client),
            self.config.clone(),
        )));
        for handler in self.extra_tools {
            registry.register(handler);
        }

        let driver = GenerationDriver::new(
            Arc::clone(&client),
            Arc::clone(&store),
            Arc::new(registry),
            self.config,
        );

        Ok(ConversationOrchestrator::new(client, store, driver))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
