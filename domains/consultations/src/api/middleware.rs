//! Consultations domain state and auth backend integration

use crate::ConsultationsRepositories;
use axum::extract::FromRef;
use medlink_auth::AuthBackend;

/// Application state for the Consultations domain
#[derive(Clone)]
pub struct ConsultationsState {
    pub repos: ConsultationsRepositories,
    pub auth: AuthBackend,
}

impl FromRef<ConsultationsState> for AuthBackend {
    fn from_ref(state: &ConsultationsState) -> Self {
        state.auth.clone()
    }
}
