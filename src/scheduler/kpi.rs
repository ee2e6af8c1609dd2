//! Schedule quality metrics (KPIs).
//!
//! Computes standard scheduling performance indicators from a
//! solved timetable and its input jobs.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest end time |
//! | Machine Utilization | Busy time / makespan, per machine |
//! | Avg Utilization | Mean over machines that appear in the jobs |
//! | Avg Job Completion | Mean of each job's latest end time |
//! | Total Idle Time | Gaps between first start and last end, per machine |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::BTreeMap;

use crate::models::{makespan, Job, TaskSchedule};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleKpi {
    /// Makespan: latest end time.
    pub makespan: i64,
    /// Per-machine utilization (0.0..1.0).
    pub utilization_by_machine: BTreeMap<i64, f64>,
    /// Average machine utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Mean completion time over jobs with at least one entry.
    pub avg_job_completion: f64,
    /// Sum of idle gaps between the first and last task of each machine.
    pub total_idle_time: i64,
}

impl ScheduleKpi {
    /// Computes KPIs from a timetable and its input jobs.
    ///
    /// # Arguments
    /// * `jobs` - The input jobs (for the set of machines and jobs).
    /// * `output` - The solved timetable.
    pub fn calculate(jobs: &[Job], output: &[TaskSchedule]) -> Self {
        let makespan = makespan(output);

        // Busy time per machine, over every machine a job mentions
        let mut busy: BTreeMap<i64, i64> = jobs
            .iter()
            .flatten()
            .map(|task| (task.machine, 0))
            .collect();
        for entry in output {
            *busy.entry(entry.machine).or_insert(0) += entry.duration();
        }

        let utilization_by_machine: BTreeMap<i64, f64> = busy
            .iter()
            .map(|(&machine, &time)| {
                let utilization = if makespan > 0 {
                    time as f64 / makespan as f64
                } else {
                    0.0
                };
                (machine, utilization)
            })
            .collect();

        let avg_utilization = if utilization_by_machine.is_empty() {
            0.0
        } else {
            let sum: f64 = utilization_by_machine.values().sum();
            sum / utilization_by_machine.len() as f64
        };

        // Completion per job
        let mut completion: BTreeMap<usize, i64> = BTreeMap::new();
        for entry in output {
            let end = completion.entry(entry.job).or_insert(entry.end);
            *end = (*end).max(entry.end);
        }
        let avg_job_completion = if completion.is_empty() {
            0.0
        } else {
            completion.values().sum::<i64>() as f64 / completion.len() as f64
        };

        let total_idle_time = crate::models::by_machine(output)
            .values()
            .map(|entries| {
                let first = entries.iter().map(|e| e.start).min().unwrap_or(0);
                let last = entries.iter().map(|e| e.end).max().unwrap_or(0);
                let worked: i64 = entries.iter().map(|e| e.duration()).sum();
                (last - first - worked).max(0)
            })
            .sum();

        Self {
            makespan,
            utilization_by_machine,
            avg_utilization,
            avg_job_completion,
            total_idle_time,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_makespan: i64, min_utilization: f64) -> bool {
        self.makespan <= max_makespan && self.avg_utilization >= min_utilization
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskInput;

    #[test]
    fn test_kpi_basic() {
        let jobs = vec![vec![TaskInput::new(0, 1)], vec![TaskInput::new(0, 2)]];
        let output = vec![TaskSchedule::new(0, 0, 1, 0), TaskSchedule::new(0, 1, 3, 1)];

        let kpi = ScheduleKpi::calculate(&jobs, &output);
        assert_eq!(kpi.makespan, 3);
        assert!((kpi.avg_utilization - 1.0).abs() < 1e-10);
        assert!((kpi.avg_job_completion - 2.0).abs() < 1e-10); // (1+3)/2
        assert_eq!(kpi.total_idle_time, 0);
    }

    #[test]
    fn test_kpi_utilization() {
        let jobs = vec![vec![TaskInput::new(1, 2)], vec![TaskInput::new(2, 1)]];
        let output = vec![TaskSchedule::new(1, 0, 2, 0), TaskSchedule::new(2, 0, 1, 1)];

        let kpi = ScheduleKpi::calculate(&jobs, &output);
        assert_eq!(kpi.makespan, 2);
        // M1: 2/2 = 1.0, M2: 1/2 = 0.5
        assert!((kpi.utilization_by_machine[&1] - 1.0).abs() < 1e-10);
        assert!((kpi.utilization_by_machine[&2] - 0.5).abs() < 1e-10);
        assert!((kpi.avg_utilization - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_idle_time() {
        let jobs = vec![vec![TaskInput::new(0, 2), TaskInput::new(0, 1)]];
        let output = vec![TaskSchedule::new(0, 0, 2, 0), TaskSchedule::new(0, 5, 6, 0)];

        let kpi = ScheduleKpi::calculate(&jobs, &output);
        assert_eq!(kpi.total_idle_time, 3);
        assert!((kpi.avg_job_completion - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_unused_machine_counts() {
        // Machine 5 appears in the jobs but has no entries
        let jobs = vec![vec![TaskInput::new(0, 4), TaskInput::new(5, 0)]];
        let output = vec![TaskSchedule::new(0, 0, 4, 0)];

        let kpi = ScheduleKpi::calculate(&jobs, &output);
        assert_eq!(kpi.utilization_by_machine.len(), 2);
        assert!((kpi.avg_utilization - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = ScheduleKpi::calculate(&[], &[]);
        assert_eq!(kpi.makespan, 0);
        assert_eq!(kpi.total_idle_time, 0);
        assert!((kpi.avg_utilization - 0.0).abs() < 1e-10);
        assert!((kpi.avg_job_completion - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_all_zero_durations() {
        let jobs = vec![vec![TaskInput::new(0, 0)]];
        let output = vec![TaskSchedule::new(0, 0, 0, 0)];

        let kpi = ScheduleKpi::calculate(&jobs, &output);
        assert_eq!(kpi.makespan, 0);
        assert!((kpi.utilization_by_machine[&0] - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_meets_thresholds() {
        let jobs = vec![vec![TaskInput::new(0, 2)], vec![TaskInput::new(1, 1)]];
        let output = vec![TaskSchedule::new(0, 0, 2, 0), TaskSchedule::new(1, 0, 1, 1)];

        let kpi = ScheduleKpi::calculate(&jobs, &output);
        assert!(kpi.meets_thresholds(2, 0.75));
        assert!(!kpi.meets_thresholds(1, 0.0));
        assert!(!kpi.meets_thresholds(10, 0.8)); // Utilization too low
    }
}
