//! Crate error type.
//!
//! Only malformed input is an error. Engine outcomes such as infeasibility
//! are ordinary values (see [`SchedulerOutcome`](crate::models::SchedulerOutcome)).

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that stop a solve before the engine runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The jobs failed validation.
    #[error("invalid jobs data: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),
}

impl ScheduleError {
    /// Validation errors behind this error.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::InvalidInput(errors) => errors,
        }
    }
}

impl From<Vec<ValidationError>> for ScheduleError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::InvalidInput(errors)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
