//! HTTP API integration tests
//!
//! The smoke suite runs everywhere. Suites touching PostgreSQL are
//! `#[ignore]`d and expect `TEST_DATABASE_URL` to point at a disposable
//! database (run with `cargo test -- --ignored`).

mod common;

mod accounts;
mod consultations;
mod messages;
mod smoke;
