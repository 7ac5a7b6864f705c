//! Route definitions for the Consultations domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::consultations;
use super::middleware::ConsultationsState;

/// Create consultation routes
pub fn routes() -> Router<ConsultationsState> {
    Router::new()
        .route(
            "/v1/consultations",
            get(consultations::list_consultations).post(consultations::create_consultation),
        )
        .route(
            "/v1/consultations/{id}",
            get(consultations::get_consultation),
        )
        .route(
            "/v1/consultations/{id}/accept",
            post(consultations::accept_consultation),
        )
        .route(
            "/v1/consultations/{id}/reject",
            post(consultations::reject_consultation),
        )
        .route(
            "/v1/consultations/{id}/end",
            post(consultations::end_consultation),
        )
        .route(
            "/v1/consultations/{id}/reassign",
            post(consultations::reassign_doctor),
        )
}
