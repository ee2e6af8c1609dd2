//! Constraint Programming (CP) engine.
//!
//! A small, solver-agnostic modeling layer for scheduling problems plus
//! one exact solver implementation.
//!
//! # Key Components
//!
//! - **Variables**: [`IntVar`], [`IntervalVar`], addressed by [`IntVarId`] and
//!   [`IntervalId`] handles into the model's arenas
//! - **Constraints**: [`Constraint`]: NoOverlap, LessOrEqual, MaxEquality
//! - **Model**: [`CpModel`]: container for variables, constraints, objective
//! - **Solver**: [`CpSolver`] trait: interface for solver implementations,
//!   with [`BranchAndBoundSolver`] as the bundled backend
//!
//! # Design
//!
//! Consumers only build a [`CpModel`] and read back a [`CpSolution`]; any
//! backend (an external CP-SAT or ILP binding, or a custom search) can be
//! substituted behind [`CpSolver`]. Solver parameters travel in an explicit
//! [`SolverConfig`], never in process-wide state.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod search;
mod solver;
mod variables;

pub use model::{Constraint, CpModel, Objective};
pub use search::BranchAndBoundSolver;
pub use solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
pub use variables::{IntVar, IntVarId, IntervalId, IntervalVar};
