//! Job-shop domain models.
//!
//! Input types describe the problem instance; output types describe the
//! timetable returned to callers.
//!
//! # Domain Mappings
//!
//! | u-jobshop | Manufacturing | Kitchen | Logistics |
//! |-----------|--------------|---------|-----------|
//! | Job | Order | Drink / Dish | Shipment |
//! | TaskInput | Operation | Preparation step | Transport leg |
//! | machine | Machine | Station / Robot arm | Dock / Truck |
//! | TaskSchedule | Dispatch slot | Station slot | Loading slot |

mod job;
mod outcome;
mod schedule;

pub use job::{total_task_count, Job, JobsData, TaskInput};
pub use outcome::{SchedulerFailure, SchedulerOutcome, SchedulerSuccess};
pub use schedule::{by_machine, makespan, AssignedTask, TaskSchedule, Violation, ViolationType};
