//! Authorization context for authenticated users

use crate::types::{AuthIdentity, AuthRole};

/// Represents an authenticated user context
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: AuthIdentity,
}

impl AuthContext {
    /// Create new auth context for a user
    pub fn new(user: AuthIdentity) -> Self {
        Self { user }
    }

    /// Check if the user holds the patient role
    pub fn is_patient(&self) -> bool {
        self.user.role == AuthRole::Patient
    }

    /// Check if the user holds the doctor role
    pub fn is_doctor(&self) -> bool {
        self.user.role == AuthRole::Doctor
    }
}
