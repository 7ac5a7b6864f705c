//! Consultations domain: lifecycle state machine, doctor assignment

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Consultation, ConsultationStatus};
pub use domain::state::{
    ConsultationEvent, ConsultationState, ConsultationStateMachine, StateError,
};

// Re-export repository types
pub use repository::{ConsultationRepository, ConsultationsRepositories};

// Re-export API types
pub use api::routes;
pub use api::ConsultationsState;
