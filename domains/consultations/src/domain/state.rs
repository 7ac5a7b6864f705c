//! State machine for consultation status transitions
//!
//! Consultation states: Pending → Active → Inactive (terminal).
//! Reassignment is the one identity-changing transition: it swaps the
//! assigned doctor and resets the status to Pending, and is allowed from
//! any non-active state.

pub use medlink_common::StateError;
use serde::{Deserialize, Serialize};

/// Consultation states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationState {
    Pending,
    Active,
    Inactive,
}

impl ConsultationState {
    /// Get all valid next states from the current state.
    ///
    /// Reassignment is excluded here: it re-enters Pending rather than
    /// advancing along the status table.
    pub fn valid_transitions(&self) -> &'static [ConsultationState] {
        match self {
            Self::Pending => &[Self::Active, Self::Inactive],
            Self::Active => &[Self::Inactive],
            Self::Inactive => &[],
        }
    }

    /// Terminal states admit no further status-advancing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Inactive)
    }
}

impl std::fmt::Display for ConsultationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Events that trigger consultation state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsultationEvent {
    /// Assigned doctor takes the consultation on
    Accept,
    /// Assigned doctor declines a pending consultation
    Reject,
    /// Assigned doctor closes an active consultation
    End,
    /// Patient swaps the assigned doctor; status re-enters Pending
    Reassign,
}

impl std::fmt::Display for ConsultationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
            Self::End => write!(f, "end"),
            Self::Reassign => write!(f, "reassign"),
        }
    }
}

/// Consultation state machine
pub struct ConsultationStateMachine;

impl ConsultationStateMachine {
    /// Attempt a state transition
    pub fn transition(
        current: ConsultationState,
        event: ConsultationEvent,
    ) -> Result<ConsultationState, StateError> {
        let next = match (&current, &event) {
            (ConsultationState::Pending, ConsultationEvent::Accept) => ConsultationState::Active,
            (ConsultationState::Pending, ConsultationEvent::Reject) => ConsultationState::Inactive,
            (ConsultationState::Active, ConsultationEvent::End) => ConsultationState::Inactive,
            // Reassignment is permitted while not active and resets to Pending
            (ConsultationState::Pending, ConsultationEvent::Reassign)
            | (ConsultationState::Inactive, ConsultationEvent::Reassign) => {
                ConsultationState::Pending
            }
            (ConsultationState::Inactive, _) => {
                return Err(StateError::TerminalState(current.to_string()));
            }
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    to: "unknown".to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }
}
