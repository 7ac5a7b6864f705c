//! Chat domain: message relay, WebSocket channel, AI responder
//!
//! Every chat line flows persist-then-broadcast: a message is durably stored
//! before any subscriber sees it, then fanned out to the consultation's
//! broadcast group, then appended to the AI context window. Messages whose
//! content mentions the AI trigger additionally run through the AI responder
//! as a detached best-effort task.

pub mod ai;
pub mod api;
pub mod domain;
pub mod relay;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{ChatMessage, Message, MessageType, AI_SENDER_NAME, AI_SENDER_ROLE};
pub use domain::reconcile::reconcile_messages;
pub use domain::sanitize::{contains_ai_mention, sanitize_content, strip_ai_mention};

// Re-export repository types
pub use repository::{ChatRepositories, MessageRepository};

// Re-export relay types
pub use relay::hub::{RelayHub, ServerEvent};

// Re-export API types
pub use api::routes;
pub use api::ChatState;
