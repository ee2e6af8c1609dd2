//! CP variable types.

use std::fmt;

/// Handle to an integer variable inside a [`CpModel`](super::CpModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntVarId(pub(crate) usize);

/// Handle to an interval variable inside a [`CpModel`](super::CpModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntervalId(pub(crate) usize);

impl IntVarId {
    /// Position of the variable in the model's integer arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl IntervalId {
    /// Position of the variable in the model's interval arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for IntVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// An integer variable with a domain [min, max].
#[derive(Debug, Clone)]
pub struct IntVar {
    /// Variable name (diagnostics only).
    pub name: String,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
}

impl IntVar {
    /// Creates a new integer variable with the given bounds.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Domain size (max - min + 1), zero for an empty domain.
    pub fn domain_size(&self) -> i64 {
        self.max.saturating_sub(self.min).saturating_add(1).max(0)
    }
}

/// An interval variable tying two integer variables together.
///
/// The invariant `end = start + duration` is enforced by the solver.
/// Duration is a constant; job-shop tasks never stretch.
///
/// # Examples
///
/// ```
/// use u_jobshop::engine::CpModel;
///
/// let mut model = CpModel::new("example");
/// let start = model.new_int_var(0, 100, "start");
/// let end = model.new_int_var(0, 100, "end");
/// let op = model.new_interval_var(start, 30, end, "op");
/// assert_eq!(model.interval(op).duration, 30);
/// ```
#[derive(Debug, Clone)]
pub struct IntervalVar {
    /// Variable name (diagnostics only).
    pub name: String,
    /// Start time variable.
    pub start: IntVarId,
    /// End time variable.
    pub end: IntVarId,
    /// Fixed duration.
    pub duration: i64,
}

impl IntervalVar {
    /// Whether the interval occupies no time and therefore cannot overlap.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.duration == 0
    }
}
