//! Repository implementations for the Chat domain

pub mod messages;

use medlink_consultations::ConsultationRepository;
use sqlx::PgPool;

pub use messages::MessageRepository;

/// Combined repository access for the Chat domain.
///
/// Carries the consultation repository alongside the message repository: the
/// relay's access checks read consultation rows on every send and join.
#[derive(Clone)]
pub struct ChatRepositories {
    pool: PgPool,
    pub messages: MessageRepository,
    pub consultations: ConsultationRepository,
}

impl ChatRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            messages: MessageRepository::new(pool.clone()),
            consultations: ConsultationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Get a reference to the underlying pool (for cross-domain transactions)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
