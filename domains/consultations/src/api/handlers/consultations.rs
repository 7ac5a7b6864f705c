//! Consultation lifecycle API handlers
//!
//! Status-change authority is exclusively the assigned doctor's (accept,
//! reject, end), except reassignment, which is exclusively the patient's and
//! implicitly resets the status to pending.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use medlink_auth::{AuthRole, AuthUser, DoctorUser, PatientUser};
use medlink_common::{Error, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::ConsultationsState;
use crate::domain::entities::{Consultation, ConsultationStatus};
use crate::domain::state::{ConsultationEvent, ConsultationStateMachine};

/// Request for creating a consultation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateConsultationRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 2000))]
    pub description: String,

    /// The doctor the patient wants to consult
    pub doctor_id: Uuid,
}

/// Request for reassigning the doctor
#[derive(Debug, Deserialize)]
pub struct ReassignDoctorRequest {
    pub doctor_id: Uuid,
}

/// Query params for listing consultations
#[derive(Debug, Deserialize)]
pub struct ListConsultationsQuery {
    pub status: Option<ConsultationStatus>,
}

/// Consultation response DTO
#[derive(Debug, Serialize)]
pub struct ConsultationResponse {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub status: ConsultationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Consultation> for ConsultationResponse {
    fn from(c: Consultation) -> Self {
        Self {
            id: c.id,
            patient_id: c.patient_id,
            doctor_id: c.doctor_id,
            title: c.title,
            description: c.description,
            status: c.status,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Create a new consultation (patients only)
pub async fn create_consultation(
    PatientUser(ctx): PatientUser,
    State(state): State<ConsultationsState>,
    ValidatedJson(req): ValidatedJson<CreateConsultationRequest>,
) -> Result<(StatusCode, Json<ConsultationResponse>)> {
    if req.doctor_id == ctx.user.id {
        return Err(Error::Validation(
            "A patient cannot assign themselves as the doctor".to_string(),
        ));
    }

    if !state
        .repos
        .consultations
        .doctor_exists(req.doctor_id)
        .await?
    {
        return Err(Error::NotFound("Doctor not found".to_string()));
    }

    let consultation =
        Consultation::new(ctx.user.id, req.doctor_id, req.title, req.description)?;

    let created = state.repos.consultations.create(&consultation).await?;

    tracing::info!(
        consultation_id = %created.id,
        patient_id = %created.patient_id,
        "Consultation created"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List consultations for the authenticated user.
///
/// Patients see everything they own, any status. Doctors see only what is
/// assigned to them and still pending or active.
pub async fn list_consultations(
    AuthUser(ctx): AuthUser,
    State(state): State<ConsultationsState>,
    Query(query): Query<ListConsultationsQuery>,
) -> Result<Json<Vec<ConsultationResponse>>> {
    let consultations = match ctx.user.role {
        AuthRole::Patient => {
            state
                .repos
                .consultations
                .list_for_patient(ctx.user.id, query.status)
                .await?
        }
        AuthRole::Doctor => {
            state
                .repos
                .consultations
                .list_for_doctor(ctx.user.id, query.status)
                .await?
        }
    };

    let responses: Vec<ConsultationResponse> =
        consultations.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Get a single consultation by ID
pub async fn get_consultation(
    AuthUser(ctx): AuthUser,
    State(state): State<ConsultationsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConsultationResponse>> {
    let consultation = state
        .repos
        .consultations
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("Consultation not found".to_string()))?;

    if !consultation.can_access(ctx.user.id, ctx.user.role) {
        return Err(Error::Forbidden(
            "You don't have access to this consultation".to_string(),
        ));
    }

    Ok(Json(consultation.into()))
}

/// Accept a pending consultation (assigned doctor only)
pub async fn accept_consultation(
    DoctorUser(ctx): DoctorUser,
    State(state): State<ConsultationsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConsultationResponse>> {
    apply_doctor_transition(&state, id, ctx.user.id, ConsultationEvent::Accept).await
}

/// Reject a pending consultation (assigned doctor only)
pub async fn reject_consultation(
    DoctorUser(ctx): DoctorUser,
    State(state): State<ConsultationsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConsultationResponse>> {
    apply_doctor_transition(&state, id, ctx.user.id, ConsultationEvent::Reject).await
}

/// End an active consultation (assigned doctor only)
pub async fn end_consultation(
    DoctorUser(ctx): DoctorUser,
    State(state): State<ConsultationsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConsultationResponse>> {
    apply_doctor_transition(&state, id, ctx.user.id, ConsultationEvent::End).await
}

/// Shared doctor-side transition: authorize, run the state machine, then
/// compare-and-swap against the status the decision was based on.
async fn apply_doctor_transition(
    state: &ConsultationsState,
    id: Uuid,
    doctor_id: Uuid,
    event: ConsultationEvent,
) -> Result<Json<ConsultationResponse>> {
    let consultation = state
        .repos
        .consultations
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("Consultation not found".to_string()))?;

    if !consultation.is_assigned_doctor(doctor_id) {
        return Err(Error::Forbidden(
            "Doctor is not assigned to this consultation".to_string(),
        ));
    }

    let next = ConsultationStateMachine::transition(consultation.status.as_state(), event)
        .map_err(|e| Error::InvalidState(e.to_string()))?;

    let updated = state
        .repos
        .consultations
        .update_status(id, consultation.status, next.into())
        .await?
        .ok_or_else(|| {
            // The CAS guard failed: another transition committed first
            Error::InvalidState(format!(
                "Consultation was already {} by a concurrent update",
                match event {
                    ConsultationEvent::Accept => "accepted",
                    _ => "processed",
                }
            ))
        })?;

    tracing::info!(
        consultation_id = %updated.id,
        doctor_id = %doctor_id,
        event = %event,
        status = %updated.status,
        "Consultation status changed"
    );

    Ok(Json(updated.into()))
}

/// Reassign the doctor on a non-active consultation (owning patient only).
///
/// Resets the status to pending so the new doctor can accept or reject.
pub async fn reassign_doctor(
    PatientUser(ctx): PatientUser,
    State(state): State<ConsultationsState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReassignDoctorRequest>,
) -> Result<Json<ConsultationResponse>> {
    let consultation = state
        .repos
        .consultations
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("Consultation not found".to_string()))?;

    if consultation.patient_id != ctx.user.id {
        return Err(Error::Forbidden(
            "Only the patient can reassign a doctor".to_string(),
        ));
    }

    if consultation.doctor_id == Some(req.doctor_id) {
        return Err(Error::Validation(
            "Consultation is already assigned to this doctor".to_string(),
        ));
    }

    if req.doctor_id == ctx.user.id {
        return Err(Error::Validation(
            "A patient cannot assign themselves as the doctor".to_string(),
        ));
    }

    if !state
        .repos
        .consultations
        .doctor_exists(req.doctor_id)
        .await?
    {
        return Err(Error::NotFound("Doctor not found".to_string()));
    }

    // Reassignment is blocked while the consultation is active
    ConsultationStateMachine::transition(
        consultation.status.as_state(),
        ConsultationEvent::Reassign,
    )
    .map_err(|e| Error::InvalidState(e.to_string()))?;

    let updated = state
        .repos
        .consultations
        .reassign_doctor(id, consultation.status, req.doctor_id)
        .await?
        .ok_or_else(|| {
            Error::InvalidState(
                "Consultation status changed before the doctor could be reassigned".to_string(),
            )
        })?;

    tracing::info!(
        consultation_id = %updated.id,
        new_doctor_id = %req.doctor_id,
        "Doctor reassigned"
    );

    Ok(Json(updated.into()))
}
