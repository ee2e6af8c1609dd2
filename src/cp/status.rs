//! Maps an engine status onto a scheduling outcome.
//!
//! | Engine status | Outcome |
//! |---------------|---------|
//! | `OPTIMAL`, `FEASIBLE` | `Success` with the engine's objective and the timetable |
//! | `INFEASIBLE`, `MODEL_INVALID`, `UNKNOWN` | `Failure` with `"No solution found: <STATUS>"` |
//!
//! No retries: the first engine answer is final.

use tracing::warn;

use super::{extract_schedule, TaskVariables};
use crate::engine::{CpSolution, SolverStatus};
use crate::models::{makespan, Job, SchedulerOutcome, SchedulerSuccess};

/// Translates a solver result into a [`SchedulerOutcome`].
///
/// A solver that claims success but omits a start value is reported as
/// `UNKNOWN`. A missing objective value falls back to the timetable's
/// makespan.
pub fn translate_status(
    jobs: &[Job],
    tasks: &[Vec<TaskVariables>],
    solution: &CpSolution,
) -> SchedulerOutcome {
    match solution.status {
        SolverStatus::Optimal | SolverStatus::Feasible => {
            match extract_schedule(jobs, tasks, solution) {
                Ok(output) => SchedulerOutcome::Success(SchedulerSuccess {
                    objective_value: solution
                        .objective_value
                        .unwrap_or_else(|| makespan(&output) as f64),
                    output,
                }),
                Err(err) => {
                    warn!(status = %solution.status, %err, "solver reported a solution without values");
                    SchedulerOutcome::failure(SolverStatus::Unknown.name())
                }
            }
        }
        status @ (SolverStatus::Infeasible | SolverStatus::ModelInvalid | SolverStatus::Unknown) => {
            SchedulerOutcome::failure(status.name())
        }
    }
}
