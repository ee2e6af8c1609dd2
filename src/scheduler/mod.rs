//! Job-shop scheduling facade, KPI evaluation and schedule verification.
//!
//! # Algorithm
//!
//! `JobShopScheduler` builds a CP model per call and minimizes makespan
//! with a branch-and-bound engine. Without a time limit the result is
//! optimal and reproducible for a given seed and worker count.
//!
//! # KPI
//!
//! `ScheduleKpi` computes standard scheduling metrics: makespan,
//! utilization, idle time, and job completion.
//!
//! # Verification
//!
//! `verify_schedule` re-checks a timetable against its jobs and lists
//! every defect found.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod jobshop;
mod kpi;
mod verify;

pub use jobshop::{schedule_jobs, JobShopScheduler, SchedulerConfig};
pub use kpi::ScheduleKpi;
pub use verify::verify_schedule;
