//! Input validation for job-shop problems.
//!
//! Checks structural integrity of the jobs before a model is built.
//! Detects:
//! - An empty job list
//! - Jobs without tasks
//! - Negative machine ids or durations
//! - Duration sums beyond [`MAX_HORIZON`]
//!
//! Zero durations are legal. Machine ids may be sparse.

use thiserror::Error;

use crate::models::Job;

/// Largest accepted sum of durations (2^53).
///
/// Every integer up to this value is exact as `f64`, so the reported
/// objective always equals the makespan.
pub const MAX_HORIZON: i64 = 1 << 53;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// No jobs were supplied.
    EmptyJobs,
    /// A job has no tasks.
    EmptyJob,
    /// A task names a negative machine id.
    NegativeMachine,
    /// A task has a negative duration.
    NegativeDuration,
    /// The sum of all durations exceeds [`MAX_HORIZON`].
    HorizonOverflow,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the jobs of a scheduling request.
///
/// Checks:
/// 1. At least one job
/// 2. Every job has at least one task
/// 3. Every machine id is non-negative
/// 4. Every duration is non-negative
/// 5. The total duration (the horizon) is at most [`MAX_HORIZON`]
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_jobs(jobs: &[Job]) -> ValidationResult {
    let mut errors = Vec::new();

    if jobs.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyJobs,
            "No jobs to schedule",
        ));
    }

    let mut horizon: Option<i64> = Some(0);

    for (j, job) in jobs.iter().enumerate() {
        if job.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyJob,
                format!("Job {j} has no tasks"),
            ));
        }

        for (t, task) in job.iter().enumerate() {
            if task.machine < 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NegativeMachine,
                    format!("Task {t} of job {j} has negative machine id {}", task.machine),
                ));
            }
            if task.duration < 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NegativeDuration,
                    format!("Task {t} of job {j} has negative duration {}", task.duration),
                ));
            } else {
                horizon = horizon.and_then(|h| h.checked_add(task.duration));
            }
        }
    }

    if horizon.map_or(true, |h| h > MAX_HORIZON) {
        errors.push(ValidationError::new(
            ValidationErrorKind::HorizonOverflow,
            format!("Sum of task durations exceeds {MAX_HORIZON}"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskInput;

    fn sample_jobs() -> Vec<Job> {
        vec![
            vec![TaskInput::new(0, 3), TaskInput::new(1, 2)],
            vec![TaskInput::new(1, 4)],
        ]
    }

    fn kinds(jobs: &[Job]) -> Vec<ValidationErrorKind> {
        validate_jobs(jobs)
            .unwrap_err()
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_jobs(&sample_jobs()).is_ok());
    }

    #[test]
    fn test_empty_jobs() {
        assert_eq!(kinds(&[]), vec![ValidationErrorKind::EmptyJobs]);
    }

    #[test]
    fn test_empty_job() {
        let jobs = vec![vec![TaskInput::new(0, 1)], vec![]];
        let errors = validate_jobs(&jobs).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyJob);
        assert_eq!(errors[0].to_string(), "Job 1 has no tasks");
    }

    #[test]
    fn test_negative_machine() {
        let jobs = vec![vec![TaskInput::new(-1, 3)]];
        assert_eq!(kinds(&jobs), vec![ValidationErrorKind::NegativeMachine]);
    }

    #[test]
    fn test_negative_duration() {
        let jobs = vec![vec![TaskInput::new(0, 3), TaskInput::new(1, -2)]];
        let errors = validate_jobs(&jobs).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::NegativeDuration);
        assert!(errors[0].message.contains("Task 1 of job 0"));
    }

    #[test]
    fn test_zero_duration_is_legal() {
        let jobs = vec![vec![TaskInput::new(0, 0), TaskInput::new(3, 0)]];
        assert!(validate_jobs(&jobs).is_ok());
    }

    #[test]
    fn test_sparse_machines_are_legal() {
        let jobs = vec![vec![TaskInput::new(0, 1)], vec![TaskInput::new(1_000_000, 1)]];
        assert!(validate_jobs(&jobs).is_ok());
    }

    #[test]
    fn test_horizon_overflow() {
        let jobs = vec![vec![TaskInput::new(0, i64::MAX)], vec![TaskInput::new(1, 1)]];
        assert_eq!(kinds(&jobs), vec![ValidationErrorKind::HorizonOverflow]);
    }

    #[test]
    fn test_horizon_beyond_exact_float_range() {
        let jobs = vec![vec![TaskInput::new(0, 1 << 61)], vec![TaskInput::new(1, 1 << 61)]];
        let errors = validate_jobs(&jobs).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::HorizonOverflow);

        let jobs = vec![vec![TaskInput::new(0, (1 << 53) + 1)]];
        assert_eq!(kinds(&jobs), vec![ValidationErrorKind::HorizonOverflow]);
    }

    #[test]
    fn test_horizon_at_limit_is_legal() {
        let half = MAX_HORIZON / 2;
        let jobs = vec![vec![TaskInput::new(0, half)], vec![TaskInput::new(1, half)]];
        assert!(validate_jobs(&jobs).is_ok());
        assert_eq!(MAX_HORIZON as f64 as i64, MAX_HORIZON);
    }

    #[test]
    fn test_multiple_errors() {
        let jobs = vec![vec![], vec![TaskInput::new(-3, -1)]];
        let errors = validate_jobs(&jobs).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
