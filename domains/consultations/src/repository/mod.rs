//! Repository implementations for the Consultations domain

pub mod consultations;

use sqlx::PgPool;

pub use consultations::ConsultationRepository;

/// Combined repository access for the Consultations domain
#[derive(Clone)]
pub struct ConsultationsRepositories {
    pool: PgPool,
    pub consultations: ConsultationRepository,
}

impl ConsultationsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            consultations: ConsultationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Get a reference to the underlying pool (for cross-domain transactions)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
