//! Authentication middleware for the Medlink API
//!
//! Sessions are issued by an external identity provider; this crate validates
//! the session JWTs it mints and exposes axum extractors that work with any
//! domain state implementing `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
mod types;

pub use backend::AuthBackend;
pub use claims::SessionClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::{AuthUser, DoctorUser, PatientUser};
pub use types::{AuthIdentity, AuthRole};
