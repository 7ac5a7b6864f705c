//! Medlink application composition root
//!
//! Composes all domain routers into a single application.

use axum::Router;
use medlink_accounts::{AccountsRepositories, AccountsState};
use medlink_auth::{AuthBackend, AuthConfig};
use medlink_chat::{ChatRepositories, ChatState, RelayHub};
use medlink_common::Config;
use medlink_consultations::{ConsultationsRepositories, ConsultationsState};
use medlink_llm::{LlmConfig, LlmService, LlmServiceFactory};
use medlink_memory::{InMemoryStore, MemoryStore};
use sqlx::PgPool;
use std::sync::Arc;

/// Create the main application router with all routes and middleware
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    // Create repositories
    let accounts_repos = AccountsRepositories::new(pool.clone());
    let consultations_repos = ConsultationsRepositories::new(pool.clone());
    let chat_repos = ChatRepositories::new(pool.clone());

    // Auth backend shared by every domain
    let auth_config = AuthConfig {
        jwt_secret: config.jwt_secret.clone(),
        issuer: config.jwt_issuer.clone(),
        audience: config.jwt_audience.clone(),
    };
    let auth = AuthBackend::new(pool.clone(), auth_config);

    // Completion service + conversational memory for the chat domain
    let llm_config = LlmConfig {
        api_key: config.anthropic_api_key.clone(),
        default_model: config.llm_model.clone(),
        max_tokens: 1024,
        base_url: None,
    };
    let llm: Arc<dyn LlmService> = Arc::from(
        LlmServiceFactory::create(&config.llm_provider, llm_config)
            .map_err(|e| anyhow::anyhow!("Failed to create completion service: {}", e))?,
    );
    let memory: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new());
    let hub = RelayHub::new();

    // Create domain states
    let accounts_state = AccountsState {
        repos: accounts_repos,
        auth: auth.clone(),
    };
    let consultations_state = ConsultationsState {
        repos: consultations_repos,
        auth: auth.clone(),
    };
    let chat_state = ChatState {
        repos: chat_repos,
        auth,
        llm,
        memory,
        hub,
    };

    // Build router — compose domain routers with shared infrastructure routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Medlink API v0.0.1-SNAPSHOT" }),
        )
        .merge(medlink_accounts::routes().with_state(accounts_state))
        .merge(medlink_consultations::routes().with_state(consultations_state))
        .merge(medlink_chat::routes().with_state(chat_state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
