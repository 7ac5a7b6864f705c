//! User repository

use crate::domain::entities::User;
use medlink_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, email_verified, image,
                   role, onboarded, metadata,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user holding the doctor role
    pub async fn find_doctor(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, email_verified, image,
                   role, onboarded, metadata,
                   created_at, updated_at
            FROM users
            WHERE id = $1 AND role = 'doctor'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List onboarded doctors for the public directory
    pub async fn list_doctors(&self) -> Result<Vec<User>> {
        let doctors = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, email_verified, image,
                   role, onboarded, metadata,
                   created_at, updated_at
            FROM users
            WHERE role = 'doctor' AND onboarded
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(doctors)
    }

    /// Persist role, profile metadata, and onboarding flag after an entity
    /// mutation (`set_role` or `complete_onboarding`)
    pub async fn update_profile(&self, user: &User) -> Result<Option<User>> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = $2,
                role = $3,
                onboarded = $4,
                metadata = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, email_verified, image,
                      role, onboarded, metadata,
                      created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.role)
        .bind(user.onboarded)
        .bind(&user.metadata)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}
