//! Consultation repository
//!
//! Status transitions are compare-and-swap updates: the `WHERE … AND status`
//! guard makes the record store enforce the precondition at commit time, so
//! two doctors racing to accept the same pending consultation cannot both
//! succeed.

use crate::domain::entities::{Consultation, ConsultationStatus};
use medlink_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ConsultationRepository {
    pool: PgPool,
}

impl ConsultationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find consultation by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Consultation>> {
        let consultation = sqlx::query_as::<_, Consultation>(
            r#"
            SELECT id, patient_id, doctor_id, title, description,
                   status, created_at, updated_at
            FROM consultations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(consultation)
    }

    /// List a patient's consultations, all statuses, optionally filtered
    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
        status: Option<ConsultationStatus>,
    ) -> Result<Vec<Consultation>> {
        let consultations = match status {
            Some(s) => {
                sqlx::query_as::<_, Consultation>(
                    r#"
                    SELECT id, patient_id, doctor_id, title, description,
                           status, created_at, updated_at
                    FROM consultations
                    WHERE patient_id = $1 AND status = $2
                    ORDER BY updated_at DESC
                    "#,
                )
                .bind(patient_id)
                .bind(s)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Consultation>(
                    r#"
                    SELECT id, patient_id, doctor_id, title, description,
                           status, created_at, updated_at
                    FROM consultations
                    WHERE patient_id = $1
                    ORDER BY updated_at DESC
                    "#,
                )
                .bind(patient_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(consultations)
    }

    /// List a doctor's consultations.
    ///
    /// Inactive consultations drop off the doctor's list; the visibility
    /// window is `{pending, active}`, optionally narrowed to one status.
    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        status: Option<ConsultationStatus>,
    ) -> Result<Vec<Consultation>> {
        let consultations = match status {
            Some(s) => {
                sqlx::query_as::<_, Consultation>(
                    r#"
                    SELECT id, patient_id, doctor_id, title, description,
                           status, created_at, updated_at
                    FROM consultations
                    WHERE doctor_id = $1
                      AND status IN ('pending', 'active')
                      AND status = $2
                    ORDER BY updated_at DESC
                    "#,
                )
                .bind(doctor_id)
                .bind(s)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Consultation>(
                    r#"
                    SELECT id, patient_id, doctor_id, title, description,
                           status, created_at, updated_at
                    FROM consultations
                    WHERE doctor_id = $1 AND status IN ('pending', 'active')
                    ORDER BY updated_at DESC
                    "#,
                )
                .bind(doctor_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(consultations)
    }

    /// Create a new consultation
    pub async fn create(&self, consultation: &Consultation) -> Result<Consultation> {
        let created = sqlx::query_as::<_, Consultation>(
            r#"
            INSERT INTO consultations (
                id, patient_id, doctor_id, title, description,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, patient_id, doctor_id, title, description,
                      status, created_at, updated_at
            "#,
        )
        .bind(consultation.id)
        .bind(consultation.patient_id)
        .bind(consultation.doctor_id)
        .bind(&consultation.title)
        .bind(&consultation.description)
        .bind(consultation.status)
        .bind(consultation.created_at)
        .bind(consultation.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Compare-and-swap status update.
    ///
    /// Returns None when the row no longer carries `expected`: the caller
    /// lost a transition race or the precondition was stale.
    pub async fn update_status(
        &self,
        id: Uuid,
        expected: ConsultationStatus,
        next: ConsultationStatus,
    ) -> Result<Option<Consultation>> {
        let updated = sqlx::query_as::<_, Consultation>(
            r#"
            UPDATE consultations SET
                status = $3,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, patient_id, doctor_id, title, description,
                      status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Compare-and-swap doctor reassignment: swaps the doctor and resets the
    /// status to pending in one guarded statement.
    pub async fn reassign_doctor(
        &self,
        id: Uuid,
        expected: ConsultationStatus,
        new_doctor_id: Uuid,
    ) -> Result<Option<Consultation>> {
        let updated = sqlx::query_as::<_, Consultation>(
            r#"
            UPDATE consultations SET
                doctor_id = $3,
                status = 'pending',
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, patient_id, doctor_id, title, description,
                      status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(new_doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// CQRS cross-domain read: does this ID belong to a doctor?
    pub async fn doctor_exists(&self, id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND role = 'doctor')",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
