//! Per-consultation broadcast groups
//!
//! Fan-out is fire-and-forget over tokio broadcast channels created lazily
//! per consultation. Delivery is not acknowledged or retried; a disconnected
//! subscriber misses events and reconciles via the durable message history.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::entities::ChatMessage;

/// Buffered events per broadcast group before slow subscribers start lagging
const GROUP_CAPACITY: usize = 64;

/// Events emitted to real-time subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A message was persisted to the subscribed consultation
    NewMessage(ChatMessage),
    /// Sent to the originating connection only, never broadcast
    Error { message: String },
}

/// Registry of per-consultation broadcast groups
#[derive(Clone, Default)]
pub struct RelayHub {
    groups: Arc<Mutex<HashMap<Uuid, broadcast::Sender<ServerEvent>>>>,
}

impl RelayHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a consultation's broadcast group, creating it if needed
    pub fn subscribe(&self, consultation_id: Uuid) -> broadcast::Receiver<ServerEvent> {
        let mut groups = self.groups.lock().expect("relay hub lock poisoned");
        groups
            .entry(consultation_id)
            .or_insert_with(|| broadcast::channel(GROUP_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to every subscriber of a consultation.
    ///
    /// Fire-and-forget: returns the number of subscribers the event reached.
    /// Groups without live subscribers are dropped from the registry.
    pub fn publish(&self, consultation_id: Uuid, event: ServerEvent) -> usize {
        let mut groups = self.groups.lock().expect("relay hub lock poisoned");

        match groups.get(&consultation_id) {
            Some(sender) => match sender.send(event) {
                Ok(receivers) => receivers,
                Err(_) => {
                    // Every receiver is gone; retire the group
                    groups.remove(&consultation_id);
                    0
                }
            },
            None => 0,
        }
    }
}
