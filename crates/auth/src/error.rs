//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    MissingAuthorization,
    InvalidAuthorizationFormat,
    InvalidToken,
    UserLoadError,
    InvalidUserId,
    MissingEmail,
    UserProvisionFailed,
    /// Caller does not hold the role this endpoint requires
    RoleRequired(&'static str),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingAuthorization => (
                StatusCode::UNAUTHORIZED,
                "MISSING_AUTHORIZATION",
                "Authorization header required".to_string(),
            ),
            AuthError::InvalidAuthorizationFormat => (
                StatusCode::UNAUTHORIZED,
                "INVALID_AUTHORIZATION",
                "Invalid authorization header format".to_string(),
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid or expired token".to_string(),
            ),
            AuthError::UserLoadError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "USER_LOAD_ERROR",
                "Failed to load user".to_string(),
            ),
            AuthError::InvalidUserId => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid user ID in token".to_string(),
            ),
            AuthError::MissingEmail => (
                StatusCode::UNAUTHORIZED,
                "MISSING_EMAIL",
                "Session token carries no email".to_string(),
            ),
            AuthError::UserProvisionFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "USER_PROVISION_FAILED",
                "Failed to provision user".to_string(),
            ),
            AuthError::RoleRequired(role) => (
                StatusCode::FORBIDDEN,
                "ROLE_REQUIRED",
                format!("This operation requires the {} role", role),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
