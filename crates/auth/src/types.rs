//! Auth CQRS read-model types
//!
//! Lightweight views of the same DB rows owned by the accounts domain.
//! These types carry only the fields needed for authentication and authorization.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lightweight identity for authenticated users.
///
/// Contains the fields needed by auth middleware and most handlers.
/// Handlers needing full `User` data (profile metadata) should load
/// from the accounts domain's repository.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: AuthRole,
    pub onboarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User role for auth decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthRole {
    Patient,
    Doctor,
}

impl std::fmt::Display for AuthRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthRole::Patient => write!(f, "patient"),
            AuthRole::Doctor => write!(f, "doctor"),
        }
    }
}
