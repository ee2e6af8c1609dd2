//! Minimum-makespan job-shop scheduler.
//!
//! # Algorithm
//!
//! 1. Validate the jobs.
//! 2. Build a fresh CP model (interval per task, `NoOverlap` per machine,
//!    intra-job precedence, makespan objective).
//! 3. Solve it with the configured engine and translate the status.
//!
//! Each call owns its model and solver state, so concurrent calls never
//! interfere.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 7: Job Shops (Makespan)

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cp::JobShopCpBuilder;
use crate::engine::{BranchAndBoundSolver, CpSolver, SolverConfig};
use crate::error::ScheduleError;
use crate::models::{Job, SchedulerOutcome};

/// Search settings for one scheduling call.
///
/// Every field is optional so a request body may omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seed for the randomized search workers (default 0).
    pub random_seed: Option<u64>,
    /// Number of parallel search workers (default 1).
    pub num_search_workers: Option<usize>,
    /// Wall-clock budget in milliseconds (default: none).
    ///
    /// A time budget makes the result depend on machine speed.
    pub time_limit_ms: Option<u64>,
    /// Search nodes per worker (default [`Self::DEFAULT_NODE_LIMIT`]).
    ///
    /// Small instances are proven optimal well within the default. Larger
    /// ones stop at the budget with the best schedule found so far, and
    /// the result is still reproducible.
    pub node_limit: Option<u64>,
}

impl SchedulerConfig {
    /// Default random seed.
    pub const DEFAULT_SEED: u64 = 0;
    /// Default worker count.
    pub const DEFAULT_WORKERS: usize = 1;
    /// Default node budget per worker.
    pub const DEFAULT_NODE_LIMIT: u64 = 100_000;

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the number of search workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.num_search_workers = Some(workers);
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the node budget per worker.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Resolves defaults into engine settings.
    pub fn to_solver_config(&self) -> SolverConfig {
        SolverConfig {
            random_seed: self.random_seed.unwrap_or(Self::DEFAULT_SEED),
            num_workers: self.num_search_workers.unwrap_or(Self::DEFAULT_WORKERS),
            time_limit_ms: self.time_limit_ms,
            node_limit: Some(self.node_limit.unwrap_or(Self::DEFAULT_NODE_LIMIT)),
        }
    }
}

/// Job-shop scheduler over a pluggable CP engine.
///
/// # Example
///
/// ```
/// use u_jobshop::models::TaskInput;
/// use u_jobshop::scheduler::{JobShopScheduler, SchedulerConfig};
///
/// let jobs = vec![
///     vec![TaskInput::new(0, 3), TaskInput::new(1, 2)],
///     vec![TaskInput::new(1, 4), TaskInput::new(0, 1)],
/// ];
/// let outcome = JobShopScheduler::new()
///     .schedule(&jobs, &SchedulerConfig::default())
///     .unwrap();
/// assert_eq!(outcome.success().unwrap().objective_value, 6.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JobShopScheduler<S = BranchAndBoundSolver> {
    solver: S,
}

impl JobShopScheduler {
    /// Creates a scheduler backed by [`BranchAndBoundSolver`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: CpSolver> JobShopScheduler<S> {
    /// Creates a scheduler backed by `solver`.
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    /// Computes a minimum-makespan schedule.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidInput`] when the jobs fail validation.
    /// Infeasible, invalid or unfinished searches are not errors; they come
    /// back as [`SchedulerOutcome::Failure`].
    pub fn schedule(
        &self,
        jobs: &[Job],
        config: &SchedulerConfig,
    ) -> Result<SchedulerOutcome, ScheduleError> {
        let started = Instant::now();
        let solver_config = config.to_solver_config();
        let outcome = JobShopCpBuilder::new(jobs).solve(&self.solver, &solver_config)?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &outcome {
            SchedulerOutcome::Success(success) => debug!(
                jobs = jobs.len(),
                makespan = success.objective_value,
                elapsed_ms,
                "schedule found"
            ),
            SchedulerOutcome::Failure(failure) => debug!(
                jobs = jobs.len(),
                status = %failure.status,
                elapsed_ms,
                "no schedule"
            ),
        }

        Ok(outcome)
    }
}

/// Computes a minimum-makespan schedule with the built-in engine.
///
/// Shorthand for `JobShopScheduler::new().schedule(jobs, config)`.
pub fn schedule_jobs(
    jobs: &[Job],
    config: &SchedulerConfig,
) -> Result<SchedulerOutcome, ScheduleError> {
    JobShopScheduler::new().schedule(jobs, config)
}
