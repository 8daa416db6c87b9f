use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resumate_api::{
    auth::{DisabledAuth, JwksVerifier, TokenVerifier},
    build_router,
    config::{Config, StorageBackend},
    state::AppState,
};
use resumate_llm::{ClientFactory, GeminiConfig, LLMClient};
use resumate_persist::{ConversationStore, InMemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env files; .env.local wins
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Resumate API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    tracing::info!(model = %config.llm.model, "Initializing Gemini client");
    let mut gemini = GeminiConfig::new(config.gemini_api_key.clone());
    if let Some(base_url) = &config.llm.base_url {
        gemini = gemini.with_base_url(base_url.clone());
    }
    let llm_client: Arc<dyn LLMClient> = ClientFactory::create_client(gemini)?;

    let store = connect_store(&config).await?;

    let auth: Arc<dyn TokenVerifier> = if config.auth.enabled {
        tracing::info!(jwks = %config.jwks_url(), "Bearer authentication enabled");
        Arc::new(JwksVerifier::new(config.jwks_url(), config.stack_project_id.clone()))
    } else {
        tracing::warn!("Authentication disabled; bearer values are trusted as user ids");
        Arc::new(DisabledAuth)
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, llm_client, store, auth)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);
    tracing::info!("API docs: http://{}/api/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn ConversationStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory conversation store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        #[cfg(feature = "mongodb")]
        StorageBackend::Mongodb => {
            tracing::info!("Connecting to MongoDB");
            let store = resumate_persist::MongoConversationStore::connect(
                &config.mongodb_uri,
                &config.mongodb.database,
            )
            .await?;
            tracing::info!("MongoDB connected");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageBackend::Mongodb => {
            anyhow::bail!("storage.backend = \"mongodb\" requires building with the `mongodb` feature")
        }
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
