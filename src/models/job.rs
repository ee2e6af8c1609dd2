//! Job-shop input model.
//!
//! A job is an ordered list of tasks; each task runs on one machine for a
//! fixed duration. Tasks of a job run strictly in list order.
//!
//! # Time Representation
//! Durations and start times are integer time units relative to t=0.
//! The consumer defines the unit (minutes, seconds, ticks).

use serde::{Deserialize, Serialize};

/// One processing step of a job.
///
/// Fields are signed so that malformed input survives deserialization
/// and is rejected by [`validate_jobs`](crate::validation::validate_jobs)
/// with a structured error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskInput {
    /// Machine the task must run on.
    pub machine: i64,
    /// Processing time.
    pub duration: i64,
}

impl TaskInput {
    /// Creates a task for `machine` lasting `duration`.
    pub fn new(machine: i64, duration: i64) -> Self {
        Self { machine, duration }
    }
}

/// A job: tasks in required processing order.
pub type Job = Vec<TaskInput>;

/// A problem instance: every job to schedule.
pub type JobsData = Vec<Job>;

/// Total number of tasks across all jobs.
pub fn total_task_count(jobs: &[Job]) -> usize {
    jobs.iter().map(Vec::len).sum()
}
