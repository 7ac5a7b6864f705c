//! Route definitions for the Accounts domain API

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{doctors, users};
use super::middleware::AccountsState;

/// Create account routes
fn account_routes() -> Router<AccountsState> {
    Router::new()
        .route("/v1/me", get(users::me))
        .route("/v1/me/role", patch(users::update_role))
        .route("/v1/me/onboarding", post(users::complete_onboarding))
}

/// Create doctor directory routes
fn doctor_routes() -> Router<AccountsState> {
    Router::new().route("/v1/doctors", get(doctors::list_doctors))
}

/// Create all Accounts domain API routes
pub fn routes() -> Router<AccountsState> {
    Router::new().merge(account_routes()).merge(doctor_routes())
}
