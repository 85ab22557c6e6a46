//! Application status state machine.
//!
//! ```text
//! Pending ──► Accepted
//!    └──────► Rejected
//! ```
//!
//! Both targets are terminal. Every application starts `Pending`.

use thiserror::Error;

use crate::errors::AppError;
use crate::models::application::ApplicationStatus;

pub const INITIAL_STATUS: ApplicationStatus = ApplicationStatus::Pending;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot change application status from {from} to {to}")]
pub struct InvalidTransition {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

impl From<InvalidTransition> for AppError {
    fn from(err: InvalidTransition) -> Self {
        AppError::Conflict(err.to_string())
    }
}

pub fn transition(
    current: ApplicationStatus,
    requested: ApplicationStatus,
) -> Result<ApplicationStatus, InvalidTransition> {
    use ApplicationStatus::*;

    match (current, requested) {
        (Pending, Accepted) | (Pending, Rejected) => Ok(requested),
        (from, to) => Err(InvalidTransition { from, to }),
    }
}
