//! HTTP handlers for the Accounts domain

pub mod doctors;
pub mod users;
