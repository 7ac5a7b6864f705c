//! Concrete authentication backend
//!
//! Wraps `PgPool` + `AuthConfig` and owns auth-specific SQL queries.
//! Uses runtime `sqlx::query_as` (not macros) consistent with the
//! CQRS cross-domain read pattern.

use sqlx::PgPool;
use uuid::Uuid;

use crate::claims::SessionClaims;
use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::types::AuthIdentity;

/// Concrete authentication backend.
///
/// Wraps a database pool and auth configuration. Provides methods
/// to look up user identities for authentication.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    pool: PgPool,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(pool: PgPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Find user identity by ID (CQRS read model — lightweight subset of User)
    pub(crate) async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, AuthError> {
        let user: Option<AuthIdentity> = sqlx::query_as(
            r#"
            SELECT id, email, name, role, onboarded,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %id, "Failed to load user");
            AuthError::UserLoadError
        })?;

        Ok(user)
    }

    /// Provision a new user from JWT claims (JIT user provisioning).
    ///
    /// Called on first authenticated request when the user doesn't exist in
    /// the DB. New users land as un-onboarded patients; onboarding fixes the
    /// final role and profile. Uses `ON CONFLICT DO NOTHING` to handle
    /// concurrent first-requests safely.
    async fn provision_user_from_jwt(
        &self,
        user_id: Uuid,
        claims: &SessionClaims,
    ) -> Result<AuthIdentity, AuthError> {
        let email = claims.email.as_deref().ok_or(AuthError::MissingEmail)?;
        let name = claims.name.as_deref().unwrap_or(email);

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, email_verified, role, onboarded, created_at, updated_at)
            VALUES ($1, $2, $3, false, 'patient', false, NOW(), NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user_id, "Failed to provision user");
            AuthError::UserProvisionFailed
        })?;

        tracing::info!(user_id = %user_id, email = %email, "JIT user provisioned");

        self.find_user(user_id).await?.ok_or_else(|| {
            tracing::error!(user_id = %user_id, "User not found after provisioning");
            AuthError::UserProvisionFailed
        })
    }

    /// Shared JWT authentication logic used by the extractors and the
    /// WebSocket upgrade path.
    pub async fn authenticate_token(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = crate::jwt::validate_jwt_token(token, &self.config)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidUserId)?;

        let user = match self.find_user(user_id).await? {
            Some(user) => user,
            None => self.provision_user_from_jwt(user_id, &claims).await?,
        };

        Ok(AuthContext::new(user))
    }
}
