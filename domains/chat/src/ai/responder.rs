//! AI responder pipeline
//!
//! Triggered when a persisted human message contains the AI mention marker.
//! The pipeline is best-effort relative to that message: it loads the
//! consultation's memory and context, assembles a single-turn completion,
//! persists and broadcasts the reply, and records a memory entry for
//! doctor-authored triggers. Failures are logged by the spawning task and
//! nothing partial is persisted or broadcast.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use medlink_auth::AuthRole;
use medlink_common::{Error, Result};
use medlink_llm::{CompletionRequest, LlmMessage, LlmRole, LlmService};
use medlink_memory::MemoryStore;
use uuid::Uuid;

use crate::domain::entities::{ChatMessage, Message};
use crate::domain::sanitize::strip_ai_mention;
use crate::relay::hub::{RelayHub, ServerEvent};
use crate::repository::ChatRepositories;

/// Context lines included in the prompt; the window retains up to 50 but the
/// prompt uses only the most recent excerpt
pub const PROMPT_CONTEXT_LINES: usize = 10;

/// Assemble the system instruction from memory entries and the context
/// excerpt.
///
/// `context` arrives most-recent-first from the store; the excerpt is the 10
/// newest lines reversed back into chronological order. Memory lines are
/// sorted by key so the prompt is stable across runs.
pub fn build_system_prompt(
    memories: &HashMap<String, String>,
    context: &[String],
) -> String {
    let mut memory_lines: Vec<String> = memories
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect();
    memory_lines.sort();

    let excerpt: Vec<&str> = context
        .iter()
        .take(PROMPT_CONTEXT_LINES)
        .rev()
        .map(String::as_str)
        .collect();

    format!(
        "You are a medical AI assistant helping in a healthcare consultation.\n\
         \n\
         Memories from this consultation:\n\
         {}\n\
         \n\
         Recent conversation context:\n\
         {}\n\
         \n\
         Guidelines:\n\
         - Provide helpful medical information but always recommend consulting healthcare professionals\n\
         - If a doctor makes a statement with @ai, create a memory entry and respond\n\
         - For questions, use existing memories as context\n\
         - Be concise and professional",
        memory_lines.join("\n"),
        excerpt.join("\n")
    )
}

/// Run the responder pipeline for one triggering message.
///
/// The caller spawns this detached and logs the error; a failure before the
/// reply is persisted leaves no trace beyond the log line.
pub async fn respond(
    repos: ChatRepositories,
    memory: Arc<dyn MemoryStore>,
    llm: Arc<dyn LlmService>,
    hub: RelayHub,
    consultation_id: Uuid,
    trigger_content: String,
    sender_role: AuthRole,
) -> Result<()> {
    // 1. Load grounding: full memory map + recent context
    let memories = memory
        .get_all_memories(consultation_id)
        .await
        .map_err(|e| Error::Internal(format!("Memory read failed: {}", e)))?;
    let context = memory
        .get_context(consultation_id)
        .await
        .map_err(|e| Error::Internal(format!("Context read failed: {}", e)))?;

    // 2-3. Single-turn completion: system instruction + triggering message
    let request = CompletionRequest {
        model: String::new(),
        system_prompt: Some(build_system_prompt(&memories, &context)),
        messages: vec![LlmMessage {
            role: LlmRole::User,
            content: trigger_content.clone(),
        }],
        max_tokens: None,
    };

    let completion = llm
        .complete(request)
        .await
        .map_err(|e| Error::Internal(format!("Completion service error: {}", e)))?;

    // 4. A doctor's triggering statement becomes a durable memory entry
    if sender_role == AuthRole::Doctor {
        let fact_key = format!("advice_{}", Utc::now().timestamp_millis());
        let fact = strip_ai_mention(&trigger_content);
        memory
            .set_memory(consultation_id, &fact_key, &fact)
            .await
            .map_err(|e| Error::Internal(format!("Memory write failed: {}", e)))?;

        tracing::debug!(
            consultation_id = %consultation_id,
            fact_key = %fact_key,
            "Recorded doctor advice memory"
        );
    }

    // 5. Persist the reply
    let message = Message::new_ai(consultation_id, completion.content)?;
    let created = repos.messages.create(&message).await?;

    // 6. Context append (same best-effort contract as human messages)
    let context_line = format!("AI: {}", created.content);
    if let Err(e) = memory.add_to_context(consultation_id, &context_line).await {
        tracing::warn!(error = %e, consultation_id = %consultation_id, "Failed to append AI context");
    }

    // 7. Broadcast with the synthetic sender label
    hub.publish(
        consultation_id,
        ServerEvent::NewMessage(ChatMessage::from_ai_message(created)),
    );

    tracing::info!(
        consultation_id = %consultation_id,
        output_tokens = completion.output_tokens,
        "AI response delivered"
    );

    Ok(())
}
