mod common;

use async_trait::async_trait;
use common::*;
use resumate_chat::{ChatConfig, GenerationDriver, ToolRegistry, TurnRequest};
use resumate_llm::Content;
use resumate_persist::{
    AttachmentKind, AttachmentRecord, ConversationStore, InMemoryStore, ListOrder, PersistError,
    Sender, StoredMessage, UserProfile,
};
use std::sync::Arc;
use std::time::Duration;

/// Model writes hang or fail; everything else goes to memory
struct FlakyStore {
    inner: InMemoryStore,
    hang: bool,
}

#[async_trait]
impl ConversationStore for FlakyStore {
    async fn append_message(
        &self,
        thread_id: &str,
        sender: Sender,
        content: &str,
    ) -> resumate_persist::Result<StoredMessage> {
        if sender == Sender::Model {
            if self.hang {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            return Err(PersistError::Connection("store unavailable".into()));
        }
        self.inner.append_message(thread_id, sender, content).await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        limit: Option<usize>,
        order: ListOrder,
    ) -> resumate_persist::Result<Vec<StoredMessage>> {
        self.inner.list_messages(thread_id, limit, order).await
    }

    async fn upsert_attachment(&self, record: AttachmentRecord) -> resumate_persist::Result<()> {
        self.inner.upsert_attachment(record).await
    }

    async fn get_attachment(
        &self,
        kind: AttachmentKind,
        thread_id: &str,
    ) -> resumate_persist::Result<Option<AttachmentRecord>> {
        self.inner.get_attachment(kind, thread_id).await
    }

    async fn delete_attachment(&self, kind: AttachmentKind, thread_id: &str) -> resumate_persist::Result<bool> {
        self.inner.delete_attachment(kind, thread_id).await
    }

    async fn upsert_user(&self, profile: UserProfile) -> resumate_persist::Result<()> {
        self.inner.upsert_user(profile).await
    }
}

fn driver(client: Arc<ScriptedClient>, store: Arc<dyn ConversationStore>) -> GenerationDriver {
    GenerationDriver::new(
        client,
        store,
        Arc::new(ToolRegistry::new()),
        ChatConfig::default().with_persist_timeout(Duration::from_millis(20)),
    )
}

fn request(prompt: &str) -> TurnRequest {
    TurnRequest {
        thread_id: "t1".into(),
        prompt: prompt.into(),
        content: Content::text(prompt),
        attachments: vec![],
    }
}

#[tokio::test]
async fn test_failed_fragment_writes_do_not_stop_the_stream() {
    let client = Arc::new(ScriptedClient::new().with_stream(StreamScript::Chunks(vec![text("a"), text("b")])));
    let store = Arc::new(FlakyStore { inner: InMemoryStore::new(), hang: false });

    let (events, outcome) = driver(client, store).stream(request("go")).await.unwrap().collect_all().await;

    assert_eq!(deltas(&events), vec!["a", "b"]);
    let summary = outcome.unwrap();
    assert_eq!(summary.deltas, 2);
    assert_eq!(summary.persisted, 0);
}

#[tokio::test]
async fn test_slow_fragment_writes_time_out() {
    let client = Arc::new(ScriptedClient::new().with_stream(StreamScript::Chunks(vec![text("slow")])));
    let store = Arc::new(FlakyStore { inner: InMemoryStore::new(), hang: true });

    let started = std::time::Instant::now();
    let (events, outcome) = driver(client, store).stream(request("go")).await.unwrap().collect_all().await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(deltas(&events), vec!["slow"]);
    assert_eq!(outcome.unwrap().persisted, 0);
}

#[tokio::test]
async fn test_empty_registry_offers_no_tools() {
    let client = Arc::new(ScriptedClient::new());
    let store: Arc<dyn ConversationStore> = Arc::new(InMemoryStore::new());
    let driver = driver(client, store);

    let provider_request = driver.build_request(&request("hi"));
    assert!(provider_request.options.tools.is_none());
    assert_eq!(provider_request.contents[0].content().as_text(), Some("hi"));
}

#[tokio::test]
async fn test_empty_provider_stream_still_closes() {
    let client = Arc::new(ScriptedClient::new().with_stream(StreamScript::Chunks(vec![done()])));
    let store: Arc<dyn ConversationStore> = Arc::new(InMemoryStore::new());

    let (events, outcome) = driver(client, store).stream(request("go")).await.unwrap().collect_all().await;

    assert_eq!(kinds(&events), vec!["start", "finish", "[DONE]"]);
    assert_eq!(outcome.unwrap().deltas, 0);
}
