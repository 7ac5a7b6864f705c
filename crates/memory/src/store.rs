//! In-process memory store implementation
//!
//! Keeps the external key layout (`ai:memory:…` / `ai:context:…`) so a
//! networked adapter can replace this one behind the same trait.

use std::collections::{HashMap, VecDeque};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{keys, MemoryError, MemoryStore, CONTEXT_WINDOW_SIZE};

/// In-process implementation of [`MemoryStore`].
///
/// Facts live in a flat string map; context windows are per-key deques with
/// newest entries at the front. Contents do not survive a process restart,
/// matching the store's weaker-durability contract.
#[derive(Default)]
pub struct InMemoryStore {
    facts: Mutex<HashMap<String, String>>,
    windows: Mutex<HashMap<String, VecDeque<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MemoryStore for InMemoryStore {
    async fn set_memory(
        &self,
        consultation_id: Uuid,
        fact_key: &str,
        value: &str,
    ) -> Result<(), MemoryError> {
        let mut facts = self.facts.lock().await;
        facts.insert(keys::memory(consultation_id, fact_key), value.to_string());
        Ok(())
    }

    async fn get_memory(
        &self,
        consultation_id: Uuid,
        fact_key: &str,
    ) -> Result<Option<String>, MemoryError> {
        let facts = self.facts.lock().await;
        Ok(facts.get(&keys::memory(consultation_id, fact_key)).cloned())
    }

    async fn get_all_memories(
        &self,
        consultation_id: Uuid,
    ) -> Result<HashMap<String, String>, MemoryError> {
        let prefix = keys::memory_prefix(consultation_id);
        let facts = self.facts.lock().await;

        Ok(facts
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|fact_key| (fact_key.to_string(), value.clone()))
            })
            .collect())
    }

    async fn add_to_context(&self, consultation_id: Uuid, line: &str) -> Result<(), MemoryError> {
        let mut windows = self.windows.lock().await;
        let window = windows.entry(keys::context(consultation_id)).or_default();

        window.push_front(line.to_string());
        window.truncate(CONTEXT_WINDOW_SIZE);
        Ok(())
    }

    async fn get_context(&self, consultation_id: Uuid) -> Result<Vec<String>, MemoryError> {
        let windows = self.windows.lock().await;
        Ok(windows
            .get(&keys::context(consultation_id))
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn clear_consultation(&self, consultation_id: Uuid) -> Result<(), MemoryError> {
        let prefix = keys::memory_prefix(consultation_id);

        let mut facts = self.facts.lock().await;
        facts.retain(|key, _| !key.starts_with(&prefix));
        drop(facts);

        let mut windows = self.windows.lock().await;
        windows.remove(&keys::context(consultation_id));

        tracing::debug!(consultation_id = %consultation_id, "Cleared consultation memory");
        Ok(())
    }
}
