//! AI responder: mention-triggered completion over conversational memory

pub mod responder;
