//! Account API handlers
//!
//! Implements the caller's own account operations:
//! - GET /v1/me - current user record
//! - PATCH /v1/me/role - change role (pre-onboarding only)
//! - POST /v1/me/onboarding - complete onboarding with a role profile

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use medlink_auth::AuthUser;
use medlink_common::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::middleware::AccountsState;
use crate::domain::entities::{RoleProfile, User, UserRole};

/// Response for account operations
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub role: UserRole,
    pub onboarded: bool,
    pub metadata: Option<RoleProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            email_verified: user.email_verified,
            image: user.image,
            role: user.role,
            onboarded: user.onboarded,
            metadata: user.metadata.map(|j| j.0),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request for changing the role before onboarding
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// Request for completing onboarding
#[derive(Debug, Deserialize)]
pub struct CompleteOnboardingRequest {
    pub role: UserRole,
    pub profile: RoleProfile,
}

/// Get the authenticated user's record
pub async fn me(
    AuthUser(ctx): AuthUser,
    State(state): State<AccountsState>,
) -> Result<Json<UserResponse>> {
    let user = state
        .repos
        .users
        .find(ctx.user.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Change the caller's role; only permitted before onboarding completes
pub async fn update_role(
    AuthUser(ctx): AuthUser,
    State(state): State<AccountsState>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>> {
    let mut user = state
        .repos
        .users
        .find(ctx.user.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    user.set_role(req.role)?;

    let updated = state
        .repos
        .users
        .update_profile(&user)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    Ok(Json(updated.into()))
}

/// Complete onboarding: fix the role and attach the matching profile
pub async fn complete_onboarding(
    AuthUser(ctx): AuthUser,
    State(state): State<AccountsState>,
    Json(req): Json<CompleteOnboardingRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let mut user = state
        .repos
        .users
        .find(ctx.user.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    user.complete_onboarding(req.role, req.profile)?;

    let updated = state
        .repos
        .users
        .update_profile(&user)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %updated.id, role = %updated.role, "Onboarding completed");

    Ok((StatusCode::OK, Json(updated.into())))
}
