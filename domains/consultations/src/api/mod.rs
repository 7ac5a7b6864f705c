//! API layer for the Consultations domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ConsultationsState;
pub use routes::routes;
