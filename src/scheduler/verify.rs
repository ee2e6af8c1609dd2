//! Schedule verification.
//!
//! Checks a timetable against the jobs it was built from. Entries carry
//! only a job index, so each job's entries are first matched to its tasks
//! in order; the checks then run over that matching:
//! - every task has exactly one entry, and every entry belongs to a task
//! - `end - start` equals the task's duration
//! - each task starts at or after the end of its predecessor (and at or
//!   after time 0)
//! - no two entries on a machine overlap (empty intervals never do)

use std::collections::BTreeMap;

use crate::models::{Job, TaskSchedule, Violation, ViolationType};

/// Returns every defect of `output` with respect to `jobs`.
///
/// An empty result means the timetable is a valid job-shop schedule.
pub fn verify_schedule(jobs: &[Job], output: &[TaskSchedule]) -> Vec<Violation> {
    let mut violations = Vec::new();
    // (job, task) for each entry, by entry position
    let mut matched: Vec<Option<(usize, usize)>> = vec![None; output.len()];

    let mut entries_by_job: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (pos, entry) in output.iter().enumerate() {
        entries_by_job.entry(entry.job).or_default().push(pos);
    }

    for (job_id, job) in jobs.iter().enumerate() {
        let mut candidates = entries_by_job.remove(&job_id).unwrap_or_default();
        candidates.sort_by_key(|&pos| (output[pos].start, output[pos].end));
        let mut used = vec![false; candidates.len()];
        let mut ready = 0;

        for (task_id, task) in job.iter().enumerate() {
            let fits = |pos: usize| {
                let entry = &output[pos];
                entry.machine == task.machine && entry.duration() == task.duration
            };
            let find = |pred: &dyn Fn(usize) -> bool| {
                (0..candidates.len()).find(|&k| !used[k] && pred(candidates[k]))
            };

            let in_order = find(&|pos| fits(pos) && output[pos].start >= ready);
            let chosen = if let Some(k) = in_order {
                Some(k)
            } else if let Some(k) = find(&fits) {
                violations.push(Violation::new(
                    ViolationType::PrecedenceViolation,
                    job_id,
                    Some(task_id),
                    format!(
                        "Task {task_id} of job {job_id} starts at {} before {ready}",
                        output[candidates[k]].start
                    ),
                ));
                Some(k)
            } else if let Some(k) = find(&|pos| output[pos].machine == task.machine) {
                violations.push(Violation::new(
                    ViolationType::DurationMismatch,
                    job_id,
                    Some(task_id),
                    format!(
                        "Task {task_id} of job {job_id} lasts {} instead of {}",
                        output[candidates[k]].duration(),
                        task.duration
                    ),
                ));
                Some(k)
            } else {
                violations.push(Violation::new(
                    ViolationType::MissingTask,
                    job_id,
                    Some(task_id),
                    format!("Task {task_id} of job {job_id} is not scheduled"),
                ));
                None
            };

            if let Some(k) = chosen {
                used[k] = true;
                let pos = candidates[k];
                matched[pos] = Some((job_id, task_id));
                ready = ready.max(output[pos].end);
            }
        }

        for (k, &pos) in candidates.iter().enumerate() {
            if !used[k] {
                violations.push(unexpected(job_id, &output[pos]));
            }
        }
    }

    // Entries naming jobs that do not exist
    for (job_id, positions) in entries_by_job {
        for pos in positions {
            violations.push(unexpected(job_id, &output[pos]));
        }
    }

    let mut machines: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (pos, entry) in output.iter().enumerate() {
        machines.entry(entry.machine).or_default().push(pos);
    }

    for (machine, mut positions) in machines {
        positions.sort_by_key(|&pos| (output[pos].start, output[pos].end));
        let mut running: Option<&TaskSchedule> = None;
        for pos in positions {
            let entry = &output[pos];
            if let Some(prev) = running.filter(|prev| prev.overlaps(entry)) {
                violations.push(Violation::new(
                    ViolationType::MachineOverlap,
                    entry.job,
                    matched[pos].map(|(_, task)| task),
                    format!(
                        "Machine {machine}: [{}, {}) of job {} overlaps [{}, {}) of job {}",
                        entry.start, entry.end, entry.job, prev.start, prev.end, prev.job
                    ),
                ));
            }
            if running.map_or(true, |prev| entry.end > prev.end) {
                running = Some(entry);
            }
        }
    }

    violations
}

fn unexpected(job: usize, entry: &TaskSchedule) -> Violation {
    Violation::new(
        ViolationType::UnexpectedTask,
        job,
        None,
        format!(
            "Entry on machine {} at [{}, {}) matches no task of job {job}",
            entry.machine, entry.start, entry.end
        ),
    )
}
