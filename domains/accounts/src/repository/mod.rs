//! Repository implementations for the Accounts domain

pub mod users;

use sqlx::PgPool;

pub use users::UserRepository;

/// Combined repository access for the Accounts domain
#[derive(Clone)]
pub struct AccountsRepositories {
    pool: PgPool,
    pub users: UserRepository,
}

impl AccountsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Get a reference to the underlying pool (for cross-domain transactions)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
