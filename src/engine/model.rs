//! CP model definition.

use super::variables::{IntVar, IntVarId, IntervalId, IntervalVar};

/// A constraint in the CP model.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Non-overlapping intervals on a shared resource.
    ///
    /// No two intervals in the set may intersect in `[start, end)`.
    /// Zero-size intervals never intersect anything.
    NoOverlap {
        /// Intervals that must not overlap.
        intervals: Vec<IntervalId>,
    },

    /// Linear difference inequality: `lhs + offset <= rhs`.
    LessOrEqual {
        lhs: IntVarId,
        rhs: IntVarId,
        offset: i64,
    },

    /// `target = max(exprs)`.
    MaxEquality {
        target: IntVarId,
        exprs: Vec<IntVarId>,
    },
}

/// Objective function for the CP model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Minimize the value of a single integer variable.
    Minimize(IntVarId),
}

/// A constraint programming model.
///
/// Variables live in index-addressed arenas; constraints refer to them
/// through [`IntVarId`] and [`IntervalId`] handles. A model is built
/// for one solve and never shared between solves.
///
/// # Examples
///
/// ```
/// use u_jobshop::engine::CpModel;
///
/// let mut model = CpModel::new("example");
/// let (s1, e1) = (model.new_int_var(0, 10, "s1"), model.new_int_var(0, 10, "e1"));
/// let (s2, e2) = (model.new_int_var(0, 10, "s2"), model.new_int_var(0, 10, "e2"));
/// let a = model.new_interval_var(s1, 4, e1, "a");
/// let b = model.new_interval_var(s2, 3, e2, "b");
/// model.add_no_overlap(vec![a, b]);
/// let makespan = model.new_int_var(0, 10, "makespan");
/// model.add_max_equality(makespan, vec![e1, e2]);
/// model.minimize(makespan);
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    /// Integer variables, addressed by [`IntVarId`].
    pub int_vars: Vec<IntVar>,
    /// Interval variables, addressed by [`IntervalId`].
    pub intervals: Vec<IntervalVar>,
    /// Constraints.
    pub constraints: Vec<Constraint>,
    /// Objective function.
    pub objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            int_vars: Vec::new(),
            intervals: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds a bounded integer variable.
    pub fn new_int_var(&mut self, min: i64, max: i64, name: impl Into<String>) -> IntVarId {
        self.int_vars.push(IntVar::new(name, min, max));
        IntVarId(self.int_vars.len() - 1)
    }

    /// Adds an interval variable with `end = start + duration`.
    pub fn new_interval_var(
        &mut self,
        start: IntVarId,
        duration: i64,
        end: IntVarId,
        name: impl Into<String>,
    ) -> IntervalId {
        self.intervals.push(IntervalVar {
            name: name.into(),
            start,
            end,
            duration,
        });
        IntervalId(self.intervals.len() - 1)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: add a no-overlap constraint.
    pub fn add_no_overlap(&mut self, intervals: Vec<IntervalId>) {
        self.add_constraint(Constraint::NoOverlap { intervals });
    }

    /// Convenience: add `lhs + offset <= rhs`.
    pub fn add_less_or_equal(&mut self, lhs: IntVarId, rhs: IntVarId, offset: i64) {
        self.add_constraint(Constraint::LessOrEqual { lhs, rhs, offset });
    }

    /// Convenience: add `target = max(exprs)`.
    pub fn add_max_equality(&mut self, target: IntVarId, exprs: Vec<IntVarId>) {
        self.add_constraint(Constraint::MaxEquality { target, exprs });
    }

    /// Sets the objective to minimizing `var`.
    pub fn minimize(&mut self, var: IntVarId) {
        self.objective = Some(Objective::Minimize(var));
    }

    /// Looks up an integer variable.
    ///
    /// # Panics
    /// If `id` was not created by this model.
    pub fn int_var(&self, id: IntVarId) -> &IntVar {
        &self.int_vars[id.0]
    }

    /// Looks up an interval variable.
    ///
    /// # Panics
    /// If `id` was not created by this model.
    pub fn interval(&self, id: IntervalId) -> &IntervalVar {
        &self.intervals[id.0]
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced handle exists, domains are ordered,
    /// durations are non-negative, and the objective target is defined by
    /// a `MaxEquality` constraint.
    pub fn validate(&self) -> Result<(), String> {
        for var in &self.int_vars {
            if var.domain_size() == 0 {
                return Err(format!(
                    "empty domain for {}: [{}, {}]",
                    var.name, var.min, var.max
                ));
            }
        }

        for interval in &self.intervals {
            self.check_var(interval.start)?;
            self.check_var(interval.end)?;
            if interval.duration < 0 {
                return Err(format!(
                    "negative duration for {}: {}",
                    interval.name, interval.duration
                ));
            }
        }

        for constraint in &self.constraints {
            match constraint {
                Constraint::NoOverlap { intervals } => {
                    for &id in intervals {
                        self.check_interval(id)?;
                    }
                }
                Constraint::LessOrEqual { lhs, rhs, .. } => {
                    self.check_var(*lhs)?;
                    self.check_var(*rhs)?;
                }
                Constraint::MaxEquality { target, exprs } => {
                    self.check_var(*target)?;
                    if exprs.is_empty() {
                        return Err(format!("max equality over no expressions for {target}"));
                    }
                    for &id in exprs {
                        self.check_var(id)?;
                    }
                }
            }
        }

        if let Some(Objective::Minimize(target)) = self.objective {
            self.check_var(target)?;
            let defined = self.constraints.iter().any(|c| {
                matches!(c, Constraint::MaxEquality { target: t, .. } if *t == target)
            });
            if !defined {
                return Err(format!(
                    "objective variable {} is not defined by a max equality",
                    self.int_vars[target.0].name
                ));
            }
        }

        Ok(())
    }

    fn check_var(&self, id: IntVarId) -> Result<(), String> {
        if id.0 < self.int_vars.len() {
            Ok(())
        } else {
            Err(format!("undefined integer variable: {id}"))
        }
    }

    fn check_interval(&self, id: IntervalId) -> Result<(), String> {
        if id.0 < self.intervals.len() {
            Ok(())
        } else {
            Err(format!("undefined interval: {id}"))
        }
    }

    /// Returns the number of integer variables.
    pub fn int_var_count(&self) -> usize {
        self.int_vars.len()
    }

    /// Returns the number of interval variables.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_intervals() -> (CpModel, IntervalId, IntervalId) {
        let mut model = CpModel::new("test");
        let s1 = model.new_int_var(0, 100, "s1");
        let e1 = model.new_int_var(0, 100, "e1");
        let s2 = model.new_int_var(0, 100, "s2");
        let e2 = model.new_int_var(0, 100, "e2");
        let a = model.new_interval_var(s1, 50, e1, "a");
        let b = model.new_interval_var(s2, 30, e2, "b");
        (model, a, b)
    }

    #[test]
    fn test_model_creation() {
        let (mut model, a, b) = two_intervals();
        model.add_no_overlap(vec![a, b]);

        assert_eq!(model.interval_count(), 2);
        assert_eq!(model.int_var_count(), 4);
        assert_eq!(model.constraint_count(), 1);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_add_constraint_matches_helpers() {
        let (mut model, a, b) = two_intervals();
        model.add_constraint(Constraint::NoOverlap {
            intervals: vec![a, b],
        });
        model.add_no_overlap(vec![a, b]);

        assert_eq!(model.constraint_count(), 2);
        assert!(matches!(
            &model.constraints[0],
            Constraint::NoOverlap { intervals } if intervals == &vec![a, b]
        ));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_full_range_domain_is_valid() {
        let mut model = CpModel::new("test");
        model.new_int_var(i64::MIN, i64::MAX, "x");
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_precedence() {
        let (mut model, a, b) = two_intervals();
        let end_a = model.interval(a).end;
        let start_b = model.interval(b).start;
        model.add_less_or_equal(end_a, start_b, 0);

        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_undefined_interval() {
        let mut model = CpModel::new("test");
        model.add_no_overlap(vec![IntervalId(4)]);

        let err = model.validate().unwrap_err();
        assert!(err.contains("undefined interval"));
    }

    #[test]
    fn test_empty_domain() {
        let mut model = CpModel::new("test");
        model.new_int_var(5, 2, "x");

        assert!(model.validate().is_err());
    }

    #[test]
    fn test_negative_duration() {
        let mut model = CpModel::new("test");
        let s = model.new_int_var(0, 10, "s");
        let e = model.new_int_var(0, 10, "e");
        model.new_interval_var(s, -1, e, "bad");

        assert!(model.validate().unwrap_err().contains("negative duration"));
    }

    #[test]
    fn test_objective_requires_definition() {
        let (mut model, a, _) = two_intervals();
        let makespan = model.new_int_var(0, 100, "makespan");
        model.minimize(makespan);
        assert!(model.validate().is_err());

        let end_a = model.interval(a).end;
        model.add_max_equality(makespan, vec![end_a]);
        assert!(model.validate().is_ok());
        assert_eq!(model.objective, Some(Objective::Minimize(makespan)));
    }

    #[test]
    fn test_empty_max_equality() {
        let mut model = CpModel::new("test");
        let m = model.new_int_var(0, 10, "m");
        model.add_max_equality(m, vec![]);

        assert!(model.validate().is_err());
    }
}
