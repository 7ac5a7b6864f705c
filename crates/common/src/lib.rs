//! Shared utilities, configuration, and error handling for Medlink
//!
//! This crate provides common functionality used across the Medlink application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Request extractors
//! - State machine error types

pub mod config;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson};
pub use state::StateError;
