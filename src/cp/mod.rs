//! CP-based job-shop formulation.
//!
//! Bridges job-shop domain models to the [`engine`](crate::engine) CP layer.
//! Builds a `CpModel` from jobs, solves it with any `CpSolver`, and turns
//! the raw solution back into a sorted timetable.
//!
//! # Formulation
//! - one interval per task, `start, end ∈ [0, horizon]`, `end = start + duration`
//! - `NoOverlap` over the intervals of each machine
//! - `end(task i) <= start(task i+1)` inside each job
//! - `makespan = max(end(last task of each job))`, minimized
//!
//! `horizon` is the sum of all durations: running every task back to back
//! is always feasible, so no schedule worth finding needs more time.
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

mod extract;
mod status;

pub use extract::{assigned_tasks, extract_schedule, MissingStartValue};
pub use status::translate_status;

use std::collections::BTreeMap;

use tracing::debug;

use crate::engine::{CpModel, CpSolver, IntVarId, IntervalId, SolverConfig};
use crate::error::ScheduleError;
use crate::models::{total_task_count, Job, SchedulerOutcome};
use crate::validation::validate_jobs;

/// Decision variables of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskVariables {
    /// Start time, in `[0, horizon]`.
    pub start: IntVarId,
    /// End time, tied to `start + duration` by the interval.
    pub end: IntVarId,
    /// Interval over `[start, end)`, posted in its machine's no-overlap set.
    pub interval: IntervalId,
}

/// A built job-shop model and the handles needed to read its solution.
///
/// Lives for a single solve; nothing in it is shared between calls.
#[derive(Debug, Clone)]
pub struct JobShopModel {
    /// The CP model submitted to the engine.
    pub model: CpModel,
    /// Task variables, indexed `[job][task]`.
    pub tasks: Vec<Vec<TaskVariables>>,
    /// Objective variable.
    pub makespan: IntVarId,
    /// `1 + max machine id`.
    pub machine_count: u64,
    /// Upper bound on every time variable.
    pub horizon: i64,
}

impl JobShopModel {
    /// Variables of task `task` of job `job`.
    pub fn task(&self, job: usize, task: usize) -> Option<&TaskVariables> {
        self.tasks.get(job)?.get(task)
    }
}

/// Builds a CP model from job-shop jobs.
///
/// # Example
/// ```
/// use u_jobshop::cp::JobShopCpBuilder;
/// use u_jobshop::engine::{BranchAndBoundSolver, SolverConfig};
/// use u_jobshop::models::TaskInput;
///
/// let jobs = vec![
///     vec![TaskInput::new(0, 3), TaskInput::new(1, 2)],
///     vec![TaskInput::new(1, 4)],
/// ];
/// let builder = JobShopCpBuilder::new(&jobs);
/// let built = builder.build().unwrap();
/// assert_eq!(built.horizon, 9);
///
/// let outcome = builder
///     .solve(&BranchAndBoundSolver::new(), &SolverConfig::default())
///     .unwrap();
/// assert!(outcome.is_success());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct JobShopCpBuilder<'a> {
    jobs: &'a [Job],
}

impl<'a> JobShopCpBuilder<'a> {
    /// Creates a new CP builder.
    pub fn new(jobs: &'a [Job]) -> Self {
        Self { jobs }
    }

    /// Validates the jobs and builds the model.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidInput`] if the jobs fail
    /// [`validate_jobs`]; no model is built in that case.
    pub fn build(&self) -> Result<JobShopModel, ScheduleError> {
        validate_jobs(self.jobs)?;

        let machine_count = self
            .jobs
            .iter()
            .flatten()
            .map(|task| task.machine as u64 + 1)
            .max()
            .unwrap_or(0);
        let horizon: i64 = self.jobs.iter().flatten().map(|task| task.duration).sum();

        let mut model = CpModel::new("jobshop");
        let mut machine_to_intervals: BTreeMap<i64, Vec<IntervalId>> = BTreeMap::new();
        let mut tasks = Vec::with_capacity(self.jobs.len());

        for (job_id, job) in self.jobs.iter().enumerate() {
            let mut vars = Vec::with_capacity(job.len());
            for (task_id, task) in job.iter().enumerate() {
                let suffix = format!("_{job_id}_{task_id}");
                let start = model.new_int_var(0, horizon, format!("start{suffix}"));
                let end = model.new_int_var(0, horizon, format!("end{suffix}"));
                let interval =
                    model.new_interval_var(start, task.duration, end, format!("interval{suffix}"));
                machine_to_intervals
                    .entry(task.machine)
                    .or_default()
                    .push(interval);
                vars.push(TaskVariables {
                    start,
                    end,
                    interval,
                });
            }
            tasks.push(vars);
        }

        // Disjunctive constraints
        for intervals in machine_to_intervals.into_values() {
            model.add_no_overlap(intervals);
        }

        // Precedences inside a job
        for vars in &tasks {
            for pair in vars.windows(2) {
                model.add_less_or_equal(pair[0].end, pair[1].start, 0);
            }
        }

        // Makespan objective
        let makespan = model.new_int_var(0, horizon, "makespan");
        let last_ends: Vec<IntVarId> = tasks
            .iter()
            .filter_map(|vars| vars.last())
            .map(|vars| vars.end)
            .collect();
        model.add_max_equality(makespan, last_ends);
        model.minimize(makespan);

        debug!(
            jobs = self.jobs.len(),
            tasks = total_task_count(self.jobs),
            machines = machine_count,
            horizon,
            constraints = model.constraint_count(),
            "built job-shop model"
        );

        Ok(JobShopModel {
            model,
            tasks,
            makespan,
            machine_count,
            horizon,
        })
    }

    /// Builds the model, solves it, and translates the result.
    ///
    /// # Errors
    /// Only validation failures are errors; every engine status is
    /// reported through the returned [`SchedulerOutcome`].
    pub fn solve<S: CpSolver + ?Sized>(
        &self,
        solver: &S,
        config: &SolverConfig,
    ) -> Result<SchedulerOutcome, ScheduleError> {
        let built = self.build()?;
        let solution = solver.solve(&built.model, config);
        Ok(translate_status(self.jobs, &built.tasks, &solution))
    }
}
