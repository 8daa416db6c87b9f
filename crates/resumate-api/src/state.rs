use std::sync::Arc;

use resumate_chat::{AttachmentService, ConversationOrchestrator};
use resumate_llm::LLMClient;
use resumate_persist::ConversationStore;

use crate::auth::TokenVerifier;
use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Everything is built once at startup and shared behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ConversationStore>,
    pub chat: Arc<ConversationOrchestrator>,
    pub uploads: AttachmentService,
    pub auth: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(
        config: Config,
        llm_client: Arc<dyn LLMClient>,
        store: Arc<dyn ConversationStore>,
        auth: Arc<dyn TokenVerifier>,
    ) -> anyhow::Result<Self> {
        let chat = ConversationOrchestrator::builder()
            .client(Arc::clone(&llm_client))
            .store(Arc::clone(&store))
            .config(config.chat_config())
            .build()?;

        let uploads = AttachmentService::new(llm_client, Arc::clone(&store))
            .with_poll_policy(config.upload.poll_policy());

        Ok(Self {
            config: Arc::new(config),
            store,
            chat: Arc::new(chat),
            uploads,
            auth,
        })
    }
}
