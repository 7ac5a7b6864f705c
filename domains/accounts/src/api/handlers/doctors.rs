//! Doctor directory API handlers
//!
//! The directory is public: patients browse it before opening a
//! consultation. Only directory-relevant fields are exposed; license
//! numbers and dates of birth never leave the server.

use axum::{extract::State, Json};
use medlink_common::Result;
use serde::Serialize;
use uuid::Uuid;

use crate::api::middleware::AccountsState;
use crate::domain::entities::{RoleProfile, User};

/// Public projection of a doctor for the directory
#[derive(Debug, Serialize)]
pub struct DoctorResponse {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub specialization: String,
    pub experience_years: Option<i32>,
}

impl DoctorResponse {
    /// Project a user row; None for rows without a doctor profile
    fn from_user(user: User) -> Option<Self> {
        match user.metadata.map(|j| j.0) {
            Some(RoleProfile::Doctor {
                specialization,
                experience_years,
                ..
            }) => Some(Self {
                id: user.id,
                name: user.name,
                image: user.image,
                specialization,
                experience_years,
            }),
            _ => None,
        }
    }
}

/// List all onboarded doctors
pub async fn list_doctors(
    State(state): State<AccountsState>,
) -> Result<Json<Vec<DoctorResponse>>> {
    let doctors = state.repos.users.list_doctors().await?;

    let responses: Vec<DoctorResponse> = doctors
        .into_iter()
        .filter_map(DoctorResponse::from_user)
        .collect();

    Ok(Json(responses))
}
