//! Chat domain layer: entities, sanitization, reconciliation

pub mod entities;
pub mod reconcile;
pub mod sanitize;
