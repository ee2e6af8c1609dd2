//! CP solver interface.

use std::fmt;

use super::model::CpModel;
use super::variables::IntVarId;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or uses constructs the solver does not support.
    ModelInvalid,
    /// Search stopped without a solution and without a proof.
    Unknown,
}

impl SolverStatus {
    /// Canonical upper-case status name, e.g. `"MODEL_INVALID"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Optimal => "OPTIMAL",
            Self::Feasible => "FEASIBLE",
            Self::Infeasible => "INFEASIBLE",
            Self::ModelInvalid => "MODEL_INVALID",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether variable values are available.
    pub fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Solution from a CP solver.
#[derive(Debug, Clone, PartialEq)]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if a solution was found). Converted from
    /// `i64`, so exact only up to 2^53 in magnitude.
    pub objective_value: Option<f64>,
    /// Integer variable values, indexed by [`IntVarId`]. Empty without a solution.
    pub values: Vec<i64>,
    /// Search nodes explored across all workers.
    pub branches: u64,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            branches: 0,
            solve_time_ms: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        self.status.has_solution()
    }

    /// Value assigned to `var`, if the solver produced one.
    pub fn value(&self, var: IntVarId) -> Option<i64> {
        self.values.get(var.index()).copied()
    }
}

/// Solver configuration.
///
/// Passed explicitly into every solve call. With a fixed `random_seed` and
/// `num_workers`, and no `time_limit_ms`, results are reproducible bit for bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Seed for the randomized workers.
    pub random_seed: u64,
    /// Number of parallel search workers (0 is treated as 1).
    pub num_workers: usize,
    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: Option<u64>,
    /// Maximum search nodes per worker.
    pub node_limit: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            random_seed: 0,
            num_workers: 1,
            time_limit_ms: None,
            node_limit: None,
        }
    }
}

impl SolverConfig {
    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the number of search workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.num_workers = workers;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the per-worker node budget.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Effective worker count.
    pub fn workers(&self) -> usize {
        self.num_workers.max(1)
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual search. The model is read-only;
/// all search state belongs to the call.
pub trait CpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}
