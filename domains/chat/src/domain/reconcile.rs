//! History / live-buffer reconciliation
//!
//! A reconnecting client holds two views of a consultation: the durable
//! message history fetched over HTTP (authoritative) and whatever it buffered
//! from the live channel (supplementary). This merge is a pure function so
//! any client can reuse it: dedupe by message ID preferring the durable
//! record, then order by creation timestamp.

use crate::domain::entities::ChatMessage;

/// Merge durable history with a live-event buffer.
///
/// Duplicates (same message ID) resolve to the history record. The result is
/// sorted by `created_at`, with the message ID as a deterministic tie-break.
pub fn reconcile_messages(
    history: Vec<ChatMessage>,
    live: Vec<ChatMessage>,
) -> Vec<ChatMessage> {
    let mut merged = history;

    for event in live {
        if !merged.iter().any(|m| m.id == event.id) {
            merged.push(event);
        }
    }

    merged.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    merged
}
