//! Accounts domain: users, role profiles, onboarding, doctor directory

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{RoleProfile, Sex, User, UserRole};

// Re-export repository types
pub use repository::{AccountsRepositories, UserRepository};

// Re-export API types
pub use api::routes;
pub use api::AccountsState;
