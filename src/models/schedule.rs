//! Schedule (solution) model.
//!
//! A schedule is a start/end placement of every task. It is reported as a
//! flat list of [`TaskSchedule`] entries sorted by start time, then machine.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Final placement of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskSchedule {
    /// Machine the task runs on.
    pub machine: i64,
    /// Start time.
    pub start: i64,
    /// End time (`start + duration`).
    pub end: i64,
    /// Index of the job the task belongs to.
    pub job: usize,
}

impl TaskSchedule {
    /// Creates a placement.
    pub fn new(machine: i64, start: i64, end: i64, job: usize) -> Self {
        Self {
            machine,
            start,
            end,
            job,
        }
    }

    /// Occupied time (end - start).
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Whether `[start, end)` intersects `other`'s interval.
    ///
    /// Empty intervals never overlap.
    pub fn overlaps(&self, other: &TaskSchedule) -> bool {
        self.start < self.end
            && other.start < other.end
            && self.start < other.end
            && other.start < self.end
    }
}

/// A task with its solved start time, before it is turned into a
/// [`TaskSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignedTask {
    /// Solved start time.
    pub start: i64,
    /// Job index.
    pub job: usize,
    /// Task index within the job.
    pub index: usize,
    /// Processing time.
    pub duration: i64,
}

impl AssignedTask {
    /// End time.
    #[inline]
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }
}

/// A defect found when checking a schedule against its jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Job index involved.
    pub job: usize,
    /// Task index involved, when one can be identified.
    pub task: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule defects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// A task has no matching schedule entry.
    MissingTask,
    /// A schedule entry matches no task.
    UnexpectedTask,
    /// A task started before its predecessor in the job finished.
    PrecedenceViolation,
    /// Two tasks share a machine at the same time.
    MachineOverlap,
    /// An entry's `end - start` differs from every task it could be.
    DurationMismatch,
}

impl Violation {
    pub(crate) fn new(
        violation_type: ViolationType,
        job: usize,
        task: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            job,
            task,
            message: message.into(),
        }
    }
}

/// Makespan: latest end time across all entries.
pub fn makespan(output: &[TaskSchedule]) -> i64 {
    output.iter().map(|t| t.end).max().unwrap_or(0)
}

/// Groups entries by machine, keeping the input order within each machine.
pub fn by_machine(output: &[TaskSchedule]) -> BTreeMap<i64, Vec<&TaskSchedule>> {
    let mut map: BTreeMap<i64, Vec<&TaskSchedule>> = BTreeMap::new();
    for entry in output {
        map.entry(entry.machine).or_default().push(entry);
    }
    map
}
