//! Chat domain state and auth backend integration

use std::sync::Arc;

use axum::extract::FromRef;
use medlink_auth::AuthBackend;
use medlink_llm::LlmService;
use medlink_memory::MemoryStore;

use crate::relay::hub::RelayHub;
use crate::ChatRepositories;

/// Application state for the Chat domain
#[derive(Clone)]
pub struct ChatState {
    pub repos: ChatRepositories,
    pub auth: AuthBackend,
    pub llm: Arc<dyn LlmService>,
    pub memory: Arc<dyn MemoryStore>,
    pub hub: RelayHub,
}

impl FromRef<ChatState> for AuthBackend {
    fn from_ref(state: &ChatState) -> Self {
        state.auth.clone()
    }
}
