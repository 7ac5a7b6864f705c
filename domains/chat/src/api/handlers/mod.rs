//! HTTP handlers for the Chat domain

pub mod messages;
