//! Axum extractors for authentication
//!
//! Generic over any state `S` where `AuthBackend: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::backend::AuthBackend;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::jwt::extract_bearer_token;
use crate::types::AuthRole;

/// Authenticated user extractor (session JWT)
#[derive(Debug)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;

        let token = extract_bearer_token(auth_header)?;
        let auth_context = backend.authenticate_token(&token).await?;

        Ok(AuthUser(auth_context))
    }
}

/// Patient-role authenticated user extractor.
///
/// Like `AuthUser` but rejects non-patient callers with 403 FORBIDDEN.
/// Use this for endpoints only patients may call (consultation creation,
/// doctor reassignment).
#[derive(Debug)]
pub struct PatientUser(pub AuthContext);

impl<S> FromRequestParts<S> for PatientUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let AuthUser(auth_context) = AuthUser::from_request_parts(parts, state).await?;

        if auth_context.user.role != AuthRole::Patient {
            return Err(AuthError::RoleRequired("patient"));
        }

        Ok(PatientUser(auth_context))
    }
}

/// Doctor-role authenticated user extractor.
///
/// Like `AuthUser` but rejects non-doctor callers with 403 FORBIDDEN.
/// Use this for the status-changing lifecycle endpoints (accept, reject, end).
#[derive(Debug)]
pub struct DoctorUser(pub AuthContext);

impl<S> FromRequestParts<S> for DoctorUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let AuthUser(auth_context) = AuthUser::from_request_parts(parts, state).await?;

        if auth_context.user.role != AuthRole::Doctor {
            return Err(AuthError::RoleRequired("doctor"));
        }

        Ok(DoctorUser(auth_context))
    }
}
