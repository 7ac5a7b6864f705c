//! Domain entities for the Consultations domain
//!
//! A consultation is one health-issue thread between exactly one patient and
//! at most one doctor. Rows are never physically deleted; `inactive` is the
//! terminal state.

use chrono::{DateTime, Utc};
use medlink_auth::AuthRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medlink_common::{Error, Result};

use crate::domain::state::ConsultationState;

/// Maximum title string length (varchar(200))
const MAX_TITLE_LENGTH: usize = 200;

/// Maximum description length (CHECK length <= 2000)
const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Consultation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "consultation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    #[default]
    Pending,
    Active,
    Inactive,
}

impl ConsultationStatus {
    /// View the persisted status through the state machine's lens
    pub fn as_state(self) -> ConsultationState {
        match self {
            ConsultationStatus::Pending => ConsultationState::Pending,
            ConsultationStatus::Active => ConsultationState::Active,
            ConsultationStatus::Inactive => ConsultationState::Inactive,
        }
    }
}

impl From<ConsultationState> for ConsultationStatus {
    fn from(state: ConsultationState) -> Self {
        match state {
            ConsultationState::Pending => ConsultationStatus::Pending,
            ConsultationState::Active => ConsultationStatus::Active,
            ConsultationState::Inactive => ConsultationStatus::Inactive,
        }
    }
}

impl std::fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsultationStatus::Pending => write!(f, "pending"),
            ConsultationStatus::Active => write!(f, "active"),
            ConsultationStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Consultation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Consultation {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub status: ConsultationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Consultation {
    /// Create a new pending consultation
    pub fn new(
        patient_id: Uuid,
        doctor_id: Uuid,
        title: String,
        description: String,
    ) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }
        if title.len() > MAX_TITLE_LENGTH {
            return Err(Error::Validation(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LENGTH
            )));
        }

        if description.trim().is_empty() {
            return Err(Error::Validation("Description is required".to_string()));
        }
        if description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(Error::Validation(format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }

        // A patient cannot be their own doctor
        if patient_id == doctor_id {
            return Err(Error::Validation(
                "A patient cannot assign themselves as the doctor".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Consultation {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id: Some(doctor_id),
            title,
            description,
            status: ConsultationStatus::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Access predicate gating both reads and messaging.
    ///
    /// The patient always has access, regardless of status. The doctor has
    /// access only while assigned and the consultation is not inactive.
    pub fn can_access(&self, user_id: Uuid, role: AuthRole) -> bool {
        match role {
            AuthRole::Patient => self.patient_id == user_id,
            AuthRole::Doctor => {
                self.doctor_id == Some(user_id) && self.status != ConsultationStatus::Inactive
            }
        }
    }

    /// Check whether the given doctor is the assigned counterparty
    pub fn is_assigned_doctor(&self, doctor_id: Uuid) -> bool {
        self.doctor_id == Some(doctor_id)
    }
}
