//! Real-time message relay
//!
//! `hub` owns the per-consultation broadcast groups, `send` is the shared
//! persist-then-broadcast pipeline behind both the HTTP and WebSocket send
//! paths, and `ws` is the WebSocket channel itself.

pub mod hub;
pub mod send;
pub mod ws;
