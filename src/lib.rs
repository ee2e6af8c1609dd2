//! Minimum-makespan job-shop scheduling.
//!
//! Takes a batch of jobs, each an ordered list of machine-bound tasks, and
//! computes a timetable where tasks of a job run in order, every machine
//! runs at most one task at a time, and the latest end time is minimal.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TaskInput`, `TaskSchedule`, `SchedulerOutcome`
//! - **`validation`**: Input integrity checks (empty jobs, negative values, overflow)
//! - **`engine`**: Constraint model (integer variables, intervals, `NoOverlap`,
//!   precedences, max-equality objective) and a parallel branch-and-bound solver
//! - **`cp`**: Job-shop formulation on top of the engine, result extraction
//!   and status translation
//! - **`scheduler`**: The `schedule_jobs` entry point, KPIs and verification
//!
//! # Example
//!
//! ```
//! use u_jobshop::models::TaskInput;
//! use u_jobshop::{schedule_jobs, SchedulerConfig};
//!
//! let jobs = vec![
//!     vec![TaskInput::new(0, 3), TaskInput::new(1, 2), TaskInput::new(2, 2)],
//!     vec![TaskInput::new(0, 2), TaskInput::new(2, 1), TaskInput::new(1, 4)],
//!     vec![TaskInput::new(1, 4), TaskInput::new(2, 3)],
//! ];
//! let outcome = schedule_jobs(&jobs, &SchedulerConfig::default()).unwrap();
//! assert_eq!(outcome.success().unwrap().objective_value, 11.0);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Brucker (2007), "Scheduling Algorithms"
//! - Giffler & Thompson (1960), "Algorithms for Solving Production-Scheduling Problems"

pub mod cp;
pub mod engine;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::ScheduleError;
pub use models::{Job, JobsData, SchedulerOutcome, TaskInput, TaskSchedule};
pub use scheduler::{schedule_jobs, SchedulerConfig};
