//! Result of one scheduling call.

use serde::{Deserialize, Serialize};

use super::TaskSchedule;

/// A solved schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSuccess {
    /// Makespan reported by the engine. Exact for validated input, whose
    /// horizon never exceeds 2^53.
    pub objective_value: f64,
    /// Every task, sorted by start time then machine.
    pub output: Vec<TaskSchedule>,
}

/// The engine found no schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerFailure {
    /// Diagnostic, e.g. `"No solution found: INFEASIBLE"`.
    pub message: String,
    /// Engine status name.
    pub status: String,
}

/// Outcome of a solve: exactly one of success or failure.
///
/// Serialized untagged, so the JSON is either
/// `{"objective_value": .., "output": [..]}` or `{"message": .., "status": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchedulerOutcome {
    Success(SchedulerSuccess),
    Failure(SchedulerFailure),
}

impl SchedulerOutcome {
    /// Builds a failure for an engine status name.
    pub fn failure(status: &str) -> Self {
        Self::Failure(SchedulerFailure {
            message: format!("No solution found: {status}"),
            status: status.to_string(),
        })
    }

    /// Whether a schedule was produced.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The schedule, if any.
    pub fn success(&self) -> Option<&SchedulerSuccess> {
        match self {
            Self::Success(success) => Some(success),
            Self::Failure(_) => None,
        }
    }

    /// The failure, if any.
    pub fn failure_info(&self) -> Option<&SchedulerFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}
