//! Domain entities for the Accounts domain
//!
//! Users carry exactly one role, fixed at onboarding. Role-specific profile
//! metadata is a tagged variant keyed by the role, with required fields
//! enforced at construction rather than stored as an untyped blob.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use validator::ValidateEmail;

use medlink_common::{Error, Result};

/// Maximum display name length (varchar(100))
const MAX_NAME_LENGTH: usize = 100;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Patient,
    Doctor,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Patient => write!(f, "patient"),
            UserRole::Doctor => write!(f, "doctor"),
        }
    }
}

/// Biological sex recorded in the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
}

/// Role-specific profile metadata, tagged by role.
///
/// Stored as JSONB on the user row. The variant must agree with the user's
/// role column; `User::complete_onboarding` enforces the pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Patient {
        name: String,
        date_of_birth: NaiveDate,
        sex: Sex,
    },
    Doctor {
        name: String,
        date_of_birth: NaiveDate,
        sex: Sex,
        specialization: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        license_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        experience_years: Option<i32>,
    },
}

impl RoleProfile {
    /// The role this profile variant belongs to
    pub fn role(&self) -> UserRole {
        match self {
            RoleProfile::Patient { .. } => UserRole::Patient,
            RoleProfile::Doctor { .. } => UserRole::Doctor,
        }
    }

    /// Display name carried by the profile
    pub fn display_name(&self) -> &str {
        match self {
            RoleProfile::Patient { name, .. } | RoleProfile::Doctor { name, .. } => name,
        }
    }

    /// Validate required fields for the variant
    pub fn validate(&self) -> Result<()> {
        let name = self.display_name();
        if name.is_empty() || name.len() > MAX_NAME_LENGTH {
            return Err(Error::Validation(format!(
                "Name must be 1-{} characters",
                MAX_NAME_LENGTH
            )));
        }

        if let RoleProfile::Doctor {
            specialization,
            experience_years,
            ..
        } = self
        {
            if specialization.trim().is_empty() {
                return Err(Error::Validation(
                    "Specialization is required for doctors".to_string(),
                ));
            }
            if let Some(years) = experience_years {
                if *years < 0 {
                    return Err(Error::Validation(
                        "Experience years cannot be negative".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub role: UserRole,
    pub onboarded: bool,
    pub metadata: Option<Json<RoleProfile>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user at account provisioning.
    ///
    /// New users start as un-onboarded patients; onboarding fixes the final
    /// role and profile.
    pub fn new(id: Uuid, email: String, name: String) -> Result<Self> {
        if !email.validate_email() {
            return Err(Error::Validation("Invalid email format".to_string()));
        }

        if name.is_empty() || name.len() > MAX_NAME_LENGTH {
            return Err(Error::Validation(format!(
                "Name must be 1-{} characters",
                MAX_NAME_LENGTH
            )));
        }

        let now = Utc::now();
        Ok(User {
            id,
            name,
            email,
            email_verified: false,
            image: None,
            role: UserRole::default(),
            onboarded: false,
            metadata: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Change the role before onboarding completes.
    ///
    /// The role is immutable once onboarding has fixed it.
    pub fn set_role(&mut self, role: UserRole) -> Result<()> {
        if self.onboarded {
            return Err(Error::InvalidState(
                "Role cannot change after onboarding".to_string(),
            ));
        }

        self.role = role;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Complete onboarding: fix the role and attach the matching profile.
    ///
    /// The profile variant must agree with the requested role; there is no
    /// re-onboarding path.
    pub fn complete_onboarding(&mut self, role: UserRole, profile: RoleProfile) -> Result<()> {
        if self.onboarded {
            return Err(Error::InvalidState(
                "Onboarding has already been completed".to_string(),
            ));
        }

        if profile.role() != role {
            return Err(Error::Validation(format!(
                "Profile metadata does not match the {} role",
                role
            )));
        }

        profile.validate()?;

        self.name = profile.display_name().to_string();
        self.role = role;
        self.metadata = Some(Json(profile));
        self.onboarded = true;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check if the user holds the doctor role
    pub fn is_doctor(&self) -> bool {
        self.role == UserRole::Doctor
    }
}
