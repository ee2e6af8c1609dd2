//! Turns solved start values into a sorted timetable.

use thiserror::Error;

use super::TaskVariables;
use crate::engine::CpSolution;
use crate::models::{AssignedTask, Job, TaskSchedule};

/// The solution carries no value for a task's start variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("solution has no start value for task {task} of job {job}")]
pub struct MissingStartValue {
    pub job: usize,
    pub task: usize,
}

/// Reads the solved start of every task, in job then task order.
pub fn assigned_tasks(
    jobs: &[Job],
    tasks: &[Vec<TaskVariables>],
    solution: &CpSolution,
) -> Result<Vec<AssignedTask>, MissingStartValue> {
    let mut assigned = Vec::with_capacity(crate::models::total_task_count(jobs));

    for (job_id, job) in jobs.iter().enumerate() {
        for (task_id, task) in job.iter().enumerate() {
            let missing = MissingStartValue {
                job: job_id,
                task: task_id,
            };
            let vars = tasks
                .get(job_id)
                .and_then(|v| v.get(task_id))
                .ok_or(missing)?;
            let start = solution.value(vars.start).ok_or(missing)?;
            assigned.push(AssignedTask {
                start,
                job: job_id,
                index: task_id,
                duration: task.duration,
            });
        }
    }

    Ok(assigned)
}

/// Builds the timetable: one entry per task, sorted by start time and then
/// machine.
///
/// The sort is stable, so entries that tie on both keys (only possible
/// with zero-duration tasks) stay in job, task order.
pub fn extract_schedule(
    jobs: &[Job],
    tasks: &[Vec<TaskVariables>],
    solution: &CpSolution,
) -> Result<Vec<TaskSchedule>, MissingStartValue> {
    let mut output: Vec<TaskSchedule> = assigned_tasks(jobs, tasks, solution)?
        .into_iter()
        .map(|a| TaskSchedule::new(jobs[a.job][a.index].machine, a.start, a.end(), a.job))
        .collect();

    output.sort_by_key(|entry| (entry.start, entry.machine));
    Ok(output)
}
