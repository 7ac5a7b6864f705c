//! Conversational memory store for the AI responder
//!
//! Two kinds of consultation-scoped state live here, both weaker-durability
//! than the record store:
//! - **Memory entries**: named free-text facts recorded during a
//!   consultation (`ai:memory:<consultationId>:<factKey>`), kept until the
//!   consultation's data is explicitly purged.
//! - **Context window**: the rolling window of recent chat lines
//!   (`ai:context:<consultationId>`), most-recent-first, trimmed to the 50
//!   newest entries on every write. Used only as LLM grounding; it is not a
//!   message log.

pub mod store;

pub use store::InMemoryStore;

use std::collections::HashMap;
use uuid::Uuid;

/// Maximum number of lines retained in a consultation's context window
pub const CONTEXT_WINDOW_SIZE: usize = 50;

/// Memory store errors
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("Memory store unavailable: {0}")]
    Unavailable(String),
}

/// Key layout shared with any external store implementation
pub mod keys {
    use uuid::Uuid;

    /// `ai:memory:<consultationId>:<factKey>`
    pub fn memory(consultation_id: Uuid, fact_key: &str) -> String {
        format!("ai:memory:{}:{}", consultation_id, fact_key)
    }

    /// Prefix selecting every memory entry of one consultation
    pub fn memory_prefix(consultation_id: Uuid) -> String {
        format!("ai:memory:{}:", consultation_id)
    }

    /// `ai:context:<consultationId>`
    pub fn context(consultation_id: Uuid) -> String {
        format!("ai:context:{}", consultation_id)
    }
}

/// Per-consultation conversational memory store contract
#[async_trait::async_trait]
pub trait MemoryStore: Send + Sync {
    /// Store a named fact for a consultation
    async fn set_memory(
        &self,
        consultation_id: Uuid,
        fact_key: &str,
        value: &str,
    ) -> Result<(), MemoryError>;

    /// Fetch one fact by key
    async fn get_memory(
        &self,
        consultation_id: Uuid,
        fact_key: &str,
    ) -> Result<Option<String>, MemoryError>;

    /// Fetch every fact recorded for a consultation, keyed by fact key
    async fn get_all_memories(
        &self,
        consultation_id: Uuid,
    ) -> Result<HashMap<String, String>, MemoryError>;

    /// Prepend a line to the context window, trimming to the 50 newest
    async fn add_to_context(&self, consultation_id: Uuid, line: &str) -> Result<(), MemoryError>;

    /// Read the context window, most-recent-first
    async fn get_context(&self, consultation_id: Uuid) -> Result<Vec<String>, MemoryError>;

    /// Purge both memory entries and the context window for a consultation.
    ///
    /// Never called automatically; exposed for explicit cleanup when a
    /// consultation's data is retired.
    async fn clear_consultation(&self, consultation_id: Uuid) -> Result<(), MemoryError>;
}
