//! Branch-and-bound solver over active schedules.
//!
//! # Algorithm
//!
//! Depth-first search where each node extends a partial schedule by one
//! interval (Giffler–Thompson branching):
//!
//! 1. Among eligible intervals (all predecessors placed), pick the one with
//!    the earliest possible completion `c*`.
//! 2. Branch on every eligible interval sharing a no-overlap set with it
//!    whose earliest start is before `c*`.
//! 3. Place the chosen interval at its earliest start.
//!
//! Every node is bounded by head + duration + tail paths and by a
//! one-machine relaxation per no-overlap set. A node whose bound is not
//! strictly below the incumbent is pruned, so the first optimal schedule in
//! branching order is the one returned.
//!
//! Before the search, greedy dives (most work remaining, then shortest
//! processing time) give an upper bound. Nodes whose bound exceeds it are
//! pruned from the start, and the greedy schedule is returned if no worker
//! beats it within its node or time budget.
//!
//! # Determinism
//!
//! Worker 0 branches in shortest-processing-time order. Workers `k >= 1`
//! shuffle branches with a `StdRng` seeded from `random_seed + k`. Workers
//! never share incumbents; the best objective wins and ties go to the
//! lowest worker index. A worker that finishes its tree only stops workers
//! with a higher index, so thread timing cannot change the answer. With a
//! node limit instead of a time limit, budgets are reproducible too.
//!
//! # Supported models
//!
//! - `LessOrEqual` between interval endpoints (precedence edges; the
//!   precedence graph must be acyclic)
//! - `NoOverlap` over any set of intervals
//! - `MaxEquality` whose expressions are interval endpoints
//! - `Minimize` of a `MaxEquality` target
//!
//! # References
//! - Giffler & Thompson (1960), "Algorithms for Solving Production-Scheduling Problems"
//! - Brucker, Jurisch & Sievers (1994), "A branch and bound algorithm for the job-shop scheduling problem"

use std::cmp::Reverse;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::model::{Constraint, CpModel, Objective};
use super::solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
use super::variables::IntervalVar;

/// Nodes between wall-clock checks.
const CLOCK_CHECK_INTERVAL: u64 = 256;

/// Exact job-shop style CP solver.
///
/// # Example
///
/// ```
/// use u_jobshop::engine::{BranchAndBoundSolver, CpModel, CpSolver, SolverConfig, SolverStatus};
///
/// let mut model = CpModel::new("single-machine");
/// let mut ends = Vec::new();
/// let mut intervals = Vec::new();
/// for (k, duration) in [3, 2, 4].into_iter().enumerate() {
///     let start = model.new_int_var(0, 9, format!("start_{k}"));
///     let end = model.new_int_var(0, 9, format!("end_{k}"));
///     intervals.push(model.new_interval_var(start, duration, end, format!("interval_{k}")));
///     ends.push(end);
/// }
/// model.add_no_overlap(intervals);
/// let makespan = model.new_int_var(0, 9, "makespan");
/// model.add_max_equality(makespan, ends);
/// model.minimize(makespan);
///
/// let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(solution.status, SolverStatus::Optimal);
/// assert_eq!(solution.objective_value, Some(9.0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();

        if let Err(reason) = model.validate() {
            debug!(model = %model.name, %reason, "model failed validation");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let problem = match Problem::compile(model) {
            Ok(problem) => problem,
            Err(CompileError::Unsupported(reason)) => {
                debug!(model = %model.name, %reason, "model uses unsupported constructs");
                return CpSolution::empty(SolverStatus::ModelInvalid);
            }
            Err(CompileError::Infeasible(reason)) => {
                debug!(model = %model.name, %reason, "model is infeasible before search");
                let mut solution = CpSolution::empty(SolverStatus::Infeasible);
                solution.solve_time_ms = elapsed_ms(started);
                return solution;
            }
        };

        debug!(
            model = %model.name,
            intervals = model.interval_count(),
            constraints = model.constraint_count(),
            workers = config.workers(),
            seed = config.random_seed,
            "starting branch and bound"
        );

        let greedy = problem.upper_bound();
        if let Some(seed) = &greedy {
            debug!(objective = seed.objective, "greedy upper bound");
        }

        let deadline = config
            .time_limit_ms
            .map(|ms| started + Duration::from_millis(ms));
        let bound = greedy.as_ref().map(|seed| seed.objective);
        let results = run_workers(&problem, config, deadline, bound);

        let exhausted = results.iter().any(|r| r.exhausted);
        let branches: u64 = results.iter().map(|r| r.nodes).sum();
        let searched = results
            .iter()
            .filter_map(|r| r.best.as_ref().map(|best| (r.index, best)))
            .min_by_key(|(index, best)| (best.objective, *index));

        let winner = match (searched, greedy.as_ref()) {
            (Some((_, found)), Some(seed)) if seed.objective < found.objective => Some(seed),
            (Some((index, found)), _) => {
                debug!(worker = index, objective = found.objective, "selected incumbent");
                Some(found)
            }
            (None, seed) => seed,
        };

        let status = match (winner.is_some(), exhausted) {
            (true, true) => SolverStatus::Optimal,
            (true, false) => SolverStatus::Feasible,
            (false, true) => SolverStatus::Infeasible,
            (false, false) => SolverStatus::Unknown,
        };

        let mut solution = CpSolution::empty(status);
        if let Some(best) = winner {
            solution.values = problem.values(&best.starts);
            solution.objective_value = Some(best.objective as f64);
        }
        solution.branches = branches;
        solution.solve_time_ms = elapsed_ms(started);

        debug!(
            model = %model.name,
            status = %solution.status,
            branches = solution.branches,
            elapsed_ms = solution.solve_time_ms,
            "search finished"
        );

        solution
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Runs one search per worker and returns their results in worker order.
fn run_workers(
    problem: &Problem,
    config: &SolverConfig,
    deadline: Option<Instant>,
    bound: Option<i64>,
) -> Vec<WorkerResult> {
    let workers = config.workers();
    let proven_by = AtomicUsize::new(usize::MAX);
    let run = |index: usize| {
        Worker::new(problem, index, config, deadline, &proven_by)
            .with_bound(bound)
            .run()
    };

    if workers == 1 {
        return vec![run(0)];
    }

    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| (0..workers).into_par_iter().map(run).collect::<Vec<_>>()),
        Err(err) => {
            warn!(%err, workers, "failed to build search pool, running workers sequentially");
            (0..workers).map(run).collect()
        }
    }
}

#[derive(Debug)]
enum CompileError {
    Unsupported(String),
    Infeasible(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Start,
    End,
}

/// Child order of a greedy dive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Priority {
    /// Longest path to the objective first.
    MostWorkRemaining,
    /// Shortest interval first.
    ShortestProcessing,
}

/// `target = max(start[i] + offset)` over the terms.
#[derive(Debug, Clone)]
struct MaxTerm {
    target: usize,
    min: i64,
    max: i64,
    terms: Vec<(usize, i64)>,
}

/// Search-ready view of a `CpModel`, indexed by interval position.
#[derive(Debug)]
struct Problem {
    duration: Vec<i64>,
    /// Zero-length intervals, which never occupy a no-overlap set.
    empty: Vec<bool>,
    release: Vec<i64>,
    latest_start: Vec<i64>,
    /// `start[i] >= end[p] + delay` for each `(p, delay)` in `preds[i]`.
    preds: Vec<Vec<(usize, i64)>>,
    succs: Vec<Vec<(usize, i64)>>,
    groups: Vec<Vec<usize>>,
    groups_of: Vec<Vec<usize>>,
    topo: Vec<usize>,
    /// Lower bound on `objective - end[i]`, if `i` reaches the objective.
    tail: Vec<Option<i64>>,
    max_terms: Vec<MaxTerm>,
    objective: Option<usize>,
    endpoint_of: Vec<Option<(usize, Endpoint)>>,
    var_min: Vec<i64>,
}

impl Problem {
    fn compile(model: &CpModel) -> Result<Self, CompileError> {
        let n = model.interval_count();

        let mut endpoint_of: Vec<Option<(usize, Endpoint)>> = vec![None; model.int_var_count()];
        for (i, interval) in model.intervals.iter().enumerate() {
            for (var, endpoint) in [(interval.start, Endpoint::Start), (interval.end, Endpoint::End)] {
                let slot = &mut endpoint_of[var.index()];
                if slot.is_some() {
                    return Err(CompileError::Unsupported(format!(
                        "variable {} is an endpoint of more than one interval",
                        model.int_var(var).name
                    )));
                }
                *slot = Some((i, endpoint));
            }
        }

        let duration: Vec<i64> = model.intervals.iter().map(|iv| iv.duration).collect();
        let empty: Vec<bool> = model.intervals.iter().map(IntervalVar::is_empty).collect();
        let mut release = Vec::with_capacity(n);
        let mut latest_start = Vec::with_capacity(n);
        for interval in &model.intervals {
            let start = model.int_var(interval.start);
            let end = model.int_var(interval.end);
            let lo = start.min.max(end.min - interval.duration);
            let hi = start.max.min(end.max - interval.duration);
            if lo > hi {
                return Err(CompileError::Infeasible(format!(
                    "interval {} does not fit its bounds",
                    interval.name
                )));
            }
            release.push(lo);
            latest_start.push(hi);
        }

        let offset = |(i, endpoint): (usize, Endpoint)| match endpoint {
            Endpoint::Start => 0,
            Endpoint::End => duration[i],
        };

        let mut preds: Vec<Vec<(usize, i64)>> = vec![Vec::new(); n];
        let mut succs: Vec<Vec<(usize, i64)>> = vec![Vec::new(); n];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut groups_of: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut max_terms: Vec<MaxTerm> = Vec::new();

        for constraint in &model.constraints {
            match constraint {
                Constraint::NoOverlap { intervals } => {
                    let g = groups.len();
                    let mut members: Vec<usize> = intervals.iter().map(|id| id.index()).collect();
                    members.sort_unstable();
                    members.dedup();
                    for &i in &members {
                        groups_of[i].push(g);
                    }
                    groups.push(members);
                }
                Constraint::LessOrEqual { lhs, rhs, offset: c } => {
                    let (Some(a), Some(b)) = (endpoint_of[lhs.index()], endpoint_of[rhs.index()])
                    else {
                        return Err(CompileError::Unsupported(format!(
                            "inequality {} <= {} does not relate interval endpoints",
                            model.int_var(*lhs).name,
                            model.int_var(*rhs).name
                        )));
                    };
                    // start[a] + shift <= start[b]
                    let shift = offset(a) + c - offset(b);
                    if a.0 == b.0 {
                        if shift > 0 {
                            return Err(CompileError::Infeasible(format!(
                                "interval {} must start after itself",
                                model.intervals[a.0].name
                            )));
                        }
                        continue;
                    }
                    let delay = shift - duration[a.0];
                    preds[b.0].push((a.0, delay));
                    succs[a.0].push((b.0, delay));
                }
                Constraint::MaxEquality { target, exprs } => {
                    if endpoint_of[target.index()].is_some()
                        || max_terms.iter().any(|m| m.target == target.index())
                    {
                        return Err(CompileError::Unsupported(format!(
                            "max equality target {} is already defined",
                            model.int_var(*target).name
                        )));
                    }
                    let terms = exprs
                        .iter()
                        .map(|var| {
                            endpoint_of[var.index()]
                                .map(|e| (e.0, offset(e)))
                                .ok_or_else(|| {
                                    CompileError::Unsupported(format!(
                                        "max equality over {} which is not an interval endpoint",
                                        model.int_var(*var).name
                                    ))
                                })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    let var = model.int_var(*target);
                    max_terms.push(MaxTerm {
                        target: target.index(),
                        min: var.min,
                        max: var.max,
                        terms,
                    });
                }
            }
        }

        let objective = match model.objective {
            Some(Objective::Minimize(var)) => max_terms
                .iter()
                .position(|m| m.target == var.index()),
            None => None,
        };

        let topo = topological_order(&preds, &succs).ok_or_else(|| {
            CompileError::Unsupported("precedence graph contains a cycle".into())
        })?;

        let mut tail: Vec<Option<i64>> = vec![None; n];
        if let Some(k) = objective {
            for &(i, off) in &max_terms[k].terms {
                let t = off - duration[i];
                tail[i] = Some(tail[i].map_or(t, |v| v.max(t)));
            }
        }
        for &i in topo.iter().rev() {
            for &(s, delay) in &succs[i] {
                if let Some(ts) = tail[s] {
                    let t = delay + duration[s] + ts;
                    tail[i] = Some(tail[i].map_or(t, |v| v.max(t)));
                }
            }
        }

        Ok(Self {
            duration,
            empty,
            release,
            latest_start,
            preds,
            succs,
            groups,
            groups_of,
            topo,
            tail,
            max_terms,
            objective,
            endpoint_of,
            var_min: model.int_vars.iter().map(|v| v.min).collect(),
        })
    }

    fn len(&self) -> usize {
        self.duration.len()
    }

    fn root(&self) -> Node {
        Node {
            start: vec![0; self.len()],
            scheduled: vec![false; self.len()],
            release: self.release.clone(),
            pending: self.preds.iter().map(Vec::len).collect(),
            group_ready: vec![i64::MIN; self.groups.len()],
            remaining: self.len(),
        }
    }

    fn shares_group(&self, a: usize, b: usize) -> bool {
        self.groups_of[a].iter().any(|g| self.groups_of[b].contains(g))
    }

    /// Earliest start of every interval given the partial schedule.
    ///
    /// Returns `None` when some interval can no longer meet its latest start.
    fn heads(&self, node: &Node) -> Option<Vec<i64>> {
        let mut head = vec![0; self.len()];
        for &i in &self.topo {
            if node.scheduled[i] {
                head[i] = node.start[i];
                continue;
            }
            let mut h = node.release[i];
            for &(p, delay) in &self.preds[i] {
                if !node.scheduled[p] {
                    h = h.max(head[p] + self.duration[p] + delay);
                }
            }
            if !self.empty[i] {
                for &g in &self.groups_of[i] {
                    h = h.max(node.group_ready[g]);
                }
            }
            if h > self.latest_start[i] {
                return None;
            }
            head[i] = h;
        }
        Some(head)
    }

    /// Lower bound on the objective of any completion of `node`.
    fn lower_bound(&self, node: &Node, head: &[i64]) -> i64 {
        let mut lb = self
            .objective
            .map_or(i64::MIN, |k| self.max_terms[k].min);

        for (i, tail) in self.tail.iter().enumerate() {
            if let Some(t) = tail {
                lb = lb.max(head[i] + self.duration[i] + t);
            }
        }

        // One-machine relaxation: for every head value, the unplaced work
        // that cannot start earlier runs back to back.
        for members in &self.groups {
            let mut pending: Vec<(i64, i64, i64)> = members
                .iter()
                .filter(|&&i| !node.scheduled[i] && !self.empty[i])
                .filter_map(|&i| self.tail[i].map(|t| (head[i], self.duration[i], t)))
                .collect();
            pending.sort_unstable_by_key(|&(h, _, _)| Reverse(h));

            let mut load = 0;
            let mut min_tail = i64::MAX;
            for (h, d, t) in pending {
                load += d;
                min_tail = min_tail.min(t);
                lb = lb.max(h + load + min_tail);
            }
        }

        lb
    }

    fn objective_ceiling(&self) -> Option<i64> {
        self.objective.map(|k| self.max_terms[k].max)
    }

    fn place(&self, node: &mut Node, i: usize, start: i64) {
        let end = start + self.duration[i];
        node.scheduled[i] = true;
        node.start[i] = start;
        node.remaining -= 1;
        if !self.empty[i] {
            for &g in &self.groups_of[i] {
                node.group_ready[g] = node.group_ready[g].max(end);
            }
        }
        for &(s, delay) in &self.succs[i] {
            node.release[s] = node.release[s].max(end + delay);
            node.pending[s] -= 1;
        }
    }

    /// Eligible intervals competing with the one that can finish first
    /// (the Giffler–Thompson conflict set). Empty when nothing is eligible.
    fn conflict_set(&self, node: &Node, head: &[i64]) -> Vec<usize> {
        let eligible: Vec<usize> = (0..self.len())
            .filter(|&i| !node.scheduled[i] && node.pending[i] == 0)
            .collect();
        let Some(&pivot) = eligible
            .iter()
            .min_by_key(|&&i| (head[i] + self.duration[i], i))
        else {
            return Vec::new();
        };

        if self.empty[pivot] || self.groups_of[pivot].is_empty() {
            return vec![pivot];
        }
        let pivot_end = head[pivot] + self.duration[pivot];
        eligible
            .into_iter()
            .filter(|&j| {
                j == pivot
                    || (!self.empty[j] && head[j] < pivot_end && self.shares_group(j, pivot))
            })
            .collect()
    }

    /// Single dive that always takes the first child under `priority`.
    fn greedy(&self, priority: Priority) -> Option<Incumbent> {
        let mut node = self.root();
        while node.remaining > 0 {
            let head = self.heads(&node)?;
            let pick = self
                .conflict_set(&node, &head)
                .into_iter()
                .min_by_key(|&j| {
                    let key = match priority {
                        Priority::MostWorkRemaining => {
                            -(self.duration[j] + self.tail[j].unwrap_or(0))
                        }
                        Priority::ShortestProcessing => self.duration[j],
                    };
                    (key, head[j], j)
                })?;
            self.place(&mut node, pick, head[pick]);
        }
        let objective = self.leaf_objective(&node.start)?;
        Some(Incumbent {
            objective,
            starts: node.start,
        })
    }

    /// Best greedy schedule; ties keep the earlier rule. `None` without an
    /// objective or when every dive dead-ends.
    fn upper_bound(&self) -> Option<Incumbent> {
        self.objective?;
        [Priority::MostWorkRemaining, Priority::ShortestProcessing]
            .into_iter()
            .filter_map(|priority| self.greedy(priority))
            .min_by_key(|seed| seed.objective)
    }

    /// Objective of a complete schedule, or `None` if a max equality
    /// target falls outside its domain.
    fn leaf_objective(&self, starts: &[i64]) -> Option<i64> {
        let mut objective = 0;
        for (k, term) in self.max_terms.iter().enumerate() {
            let value = term.terms.iter().map(|&(i, off)| starts[i] + off).max()?;
            if value < term.min || value > term.max {
                return None;
            }
            if self.objective == Some(k) {
                objective = value;
            }
        }
        Some(objective)
    }

    /// Values for every integer variable of the model.
    fn values(&self, starts: &[i64]) -> Vec<i64> {
        let mut values = self.var_min.clone();
        for (var, endpoint) in self.endpoint_of.iter().enumerate() {
            if let Some((i, endpoint)) = *endpoint {
                values[var] = match endpoint {
                    Endpoint::Start => starts[i],
                    Endpoint::End => starts[i] + self.duration[i],
                };
            }
        }
        for term in &self.max_terms {
            if let Some(value) = term.terms.iter().map(|&(i, off)| starts[i] + off).max() {
                values[term.target] = value;
            }
        }
        values
    }
}

/// Kahn's algorithm; `None` if the graph has a cycle.
fn topological_order(preds: &[Vec<(usize, i64)>], succs: &[Vec<(usize, i64)>]) -> Option<Vec<usize>> {
    let mut indegree: Vec<usize> = preds.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..preds.len()).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(preds.len());

    while let Some(i) = queue.pop_front() {
        order.push(i);
        for &(s, _) in &succs[i] {
            indegree[s] -= 1;
            if indegree[s] == 0 {
                queue.push_back(s);
            }
        }
    }

    (order.len() == preds.len()).then_some(order)
}

#[derive(Debug, Clone)]
struct Node {
    start: Vec<i64>,
    scheduled: Vec<bool>,
    release: Vec<i64>,
    pending: Vec<usize>,
    group_ready: Vec<i64>,
    remaining: usize,
}

#[derive(Debug, Clone)]
struct Incumbent {
    objective: i64,
    starts: Vec<i64>,
}

#[derive(Debug)]
struct WorkerResult {
    index: usize,
    best: Option<Incumbent>,
    exhausted: bool,
    nodes: u64,
}

struct Worker<'a> {
    problem: &'a Problem,
    index: usize,
    rng: Option<StdRng>,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    proven_by: &'a AtomicUsize,
    /// Objective of a known schedule; nodes bounded above it are pruned.
    bound: Option<i64>,
    nodes: u64,
    best: Option<Incumbent>,
}

impl<'a> Worker<'a> {
    fn new(
        problem: &'a Problem,
        index: usize,
        config: &SolverConfig,
        deadline: Option<Instant>,
        proven_by: &'a AtomicUsize,
    ) -> Self {
        let rng = (index > 0)
            .then(|| StdRng::seed_from_u64(config.random_seed.wrapping_add(index as u64)));
        Self {
            problem,
            index,
            rng,
            deadline,
            node_limit: config.node_limit,
            proven_by,
            bound: None,
            nodes: 0,
            best: None,
        }
    }

    fn with_bound(mut self, bound: Option<i64>) -> Self {
        self.bound = bound;
        self
    }

    fn run(mut self) -> WorkerResult {
        let mut stack = vec![self.problem.root()];
        let mut exhausted = true;

        while let Some(node) = stack.pop() {
            if self.should_stop() {
                exhausted = false;
                break;
            }
            self.nodes += 1;

            if node.remaining == 0 {
                self.record(&node);
                if self.problem.objective.is_none() && self.best.is_some() {
                    // Any solution is optimal without an objective.
                    break;
                }
                continue;
            }

            let children = self.expand(&node);
            stack.extend(children.into_iter().rev());
        }

        if exhausted {
            self.proven_by.fetch_min(self.index, Ordering::SeqCst);
        }

        WorkerResult {
            index: self.index,
            best: self.best,
            exhausted,
            nodes: self.nodes,
        }
    }

    fn should_stop(&self) -> bool {
        if self.proven_by.load(Ordering::Relaxed) < self.index {
            return true;
        }
        if self.node_limit.is_some_and(|limit| self.nodes >= limit) {
            return true;
        }
        match self.deadline {
            Some(deadline) => {
                self.nodes % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= deadline
            }
            None => false,
        }
    }

    fn record(&mut self, node: &Node) {
        let Some(objective) = self.problem.leaf_objective(&node.start) else {
            return;
        };
        if self.best.as_ref().map_or(true, |b| objective < b.objective) {
            self.best = Some(Incumbent {
                objective,
                starts: node.start.clone(),
            });
        }
    }

    fn expand(&mut self, node: &Node) -> Vec<Node> {
        let p = self.problem;
        let Some(head) = p.heads(node) else {
            return Vec::new();
        };

        if let Some(ceiling) = p.objective_ceiling() {
            let lb = p.lower_bound(node, &head);
            if lb > ceiling
                || self.bound.is_some_and(|ub| lb > ub)
                || self.best.as_ref().is_some_and(|b| lb >= b.objective)
            {
                return Vec::new();
            }
        }

        let mut conflict = p.conflict_set(node, &head);

        match self.rng.as_mut() {
            Some(rng) => conflict.shuffle(rng),
            None => conflict.sort_by_key(|&j| (p.duration[j], head[j], j)),
        }

        conflict
            .into_iter()
            .map(|j| {
                let mut child = node.clone();
                p.place(&mut child, j, head[j]);
                child
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{IntVarId, IntervalId};

    /// Builds a job-shop CP model directly; returns the model, the start
    /// variable of every task (flattened), and the makespan variable.
    fn job_shop(jobs: &[&[(usize, i64)]]) -> (CpModel, Vec<IntVarId>, IntVarId) {
        let horizon: i64 = jobs.iter().flat_map(|j| j.iter()).map(|t| t.1).sum();
        let machines = jobs
            .iter()
            .flat_map(|j| j.iter())
            .map(|t| t.0 + 1)
            .max()
            .unwrap_or(0);
        let mut model = CpModel::new("job-shop");
        let mut per_machine: Vec<Vec<IntervalId>> = vec![Vec::new(); machines];
        let mut starts = Vec::new();
        let mut lasts = Vec::new();

        for (j, job) in jobs.iter().enumerate() {
            let mut prev_end: Option<IntVarId> = None;
            for (t, &(machine, duration)) in job.iter().enumerate() {
                let start = model.new_int_var(0, horizon, format!("start_{j}_{t}"));
                let end = model.new_int_var(0, horizon, format!("end_{j}_{t}"));
                let interval = model.new_interval_var(start, duration, end, format!("interval_{j}_{t}"));
                per_machine[machine].push(interval);
                if let Some(prev) = prev_end {
                    model.add_less_or_equal(prev, start, 0);
                }
                prev_end = Some(end);
                starts.push(start);
            }
            lasts.extend(prev_end);
        }
        for intervals in per_machine {
            model.add_no_overlap(intervals);
        }
        let makespan = model.new_int_var(0, horizon, "makespan");
        model.add_max_equality(makespan, lasts);
        model.minimize(makespan);
        (model, starts, makespan)
    }

    fn sample() -> (CpModel, Vec<IntVarId>, IntVarId) {
        job_shop(&[
            &[(0, 3), (1, 2), (2, 2)],
            &[(0, 2), (2, 1), (1, 4)],
            &[(1, 4), (2, 3)],
        ])
    }

    #[test]
    fn test_single_machine_is_sum_of_durations() {
        let (model, _, makespan) = job_shop(&[&[(0, 3)], &[(0, 2)], &[(0, 4)]]);
        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());

        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(9.0));
        assert_eq!(solution.value(makespan), Some(9));
    }

    #[test]
    fn test_sample_optimum() {
        let (model, starts, makespan) = sample();
        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());

        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(11.0));
        assert_eq!(solution.value(makespan), Some(11));
        let values: Vec<i64> = starts.iter().map(|&s| solution.value(s).unwrap()).collect();
        assert_eq!(values, vec![2, 5, 7, 0, 2, 7, 0, 4]);
    }

    #[test]
    fn test_end_values_follow_durations() {
        let (model, _, _) = sample();
        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());

        for interval in &model.intervals {
            let start = solution.value(interval.start).unwrap();
            let end = solution.value(interval.end).unwrap();
            assert_eq!(end, start + interval.duration, "{}", interval.name);
        }
    }

    #[test]
    fn test_precedence_with_delay() {
        let mut model = CpModel::new("delay");
        let s1 = model.new_int_var(0, 100, "s1");
        let e1 = model.new_int_var(0, 100, "e1");
        let s2 = model.new_int_var(0, 100, "s2");
        let e2 = model.new_int_var(0, 100, "e2");
        model.new_interval_var(s1, 10, e1, "first");
        model.new_interval_var(s2, 5, e2, "second");
        model.add_less_or_equal(e1, s2, 7);
        let makespan = model.new_int_var(0, 100, "makespan");
        model.add_max_equality(makespan, vec![e2]);
        model.minimize(makespan);

        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.value(s2), Some(17));
        assert_eq!(solution.objective_value, Some(22.0));
    }

    #[test]
    fn test_infeasible_overlap() {
        let mut model = CpModel::new("too-tight");
        let s1 = model.new_int_var(0, 6, "s1");
        let e1 = model.new_int_var(0, 6, "e1");
        let s2 = model.new_int_var(0, 6, "s2");
        let e2 = model.new_int_var(0, 6, "e2");
        let a = model.new_interval_var(s1, 5, e1, "a");
        let b = model.new_interval_var(s2, 5, e2, "b");
        model.add_no_overlap(vec![a, b]);

        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Infeasible);
        assert!(solution.values.is_empty());
        assert!(solution.objective_value.is_none());
    }

    #[test]
    fn test_interval_outside_bounds_is_infeasible() {
        let mut model = CpModel::new("short");
        let s = model.new_int_var(0, 3, "s");
        let e = model.new_int_var(0, 3, "e");
        model.new_interval_var(s, 5, e, "long");

        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_makespan_ceiling_is_infeasible() {
        let (mut model, _, makespan) = job_shop(&[&[(0, 3)], &[(0, 2)]]);
        model.int_vars[makespan.index()].max = 4;

        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_invalid_model() {
        let mut model = CpModel::new("invalid");
        model.add_no_overlap(vec![IntervalId(3)]);

        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::ModelInvalid);
    }

    #[test]
    fn test_shared_endpoint_is_invalid() {
        let mut model = CpModel::new("shared");
        let s = model.new_int_var(0, 10, "s");
        let e = model.new_int_var(0, 10, "e");
        let e2 = model.new_int_var(0, 10, "e2");
        model.new_interval_var(s, 2, e, "a");
        model.new_interval_var(s, 2, e2, "b");

        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::ModelInvalid);
    }

    #[test]
    fn test_cyclic_precedence_is_invalid() {
        let mut model = CpModel::new("cycle");
        let s1 = model.new_int_var(0, 10, "s1");
        let e1 = model.new_int_var(0, 10, "e1");
        let s2 = model.new_int_var(0, 10, "s2");
        let e2 = model.new_int_var(0, 10, "e2");
        model.new_interval_var(s1, 1, e1, "a");
        model.new_interval_var(s2, 1, e2, "b");
        model.add_less_or_equal(e1, s2, 0);
        model.add_less_or_equal(e2, s1, 0);

        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::ModelInvalid);
    }

    #[test]
    fn test_zero_duration_does_not_block_machine() {
        let mut model = CpModel::new("zero");
        let s1 = model.new_int_var(0, 5, "s1");
        let e1 = model.new_int_var(0, 5, "e1");
        let s2 = model.new_int_var(0, 5, "s2");
        let e2 = model.new_int_var(0, 5, "e2");
        let long = model.new_interval_var(s1, 5, e1, "long");
        let empty = model.new_interval_var(s2, 0, e2, "empty");
        model.add_no_overlap(vec![long, empty]);
        let makespan = model.new_int_var(0, 5, "makespan");
        model.add_max_equality(makespan, vec![e1, e2]);
        model.minimize(makespan);

        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.value(s1), Some(0));
        assert_eq!(solution.value(s2), Some(0));
        assert_eq!(solution.objective_value, Some(5.0));
    }

    #[test]
    fn test_satisfaction_without_objective() {
        let (mut model, starts, _) = sample();
        model.objective = None;

        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.values.len(), model.int_var_count());
        assert!(starts.iter().all(|&s| solution.value(s).is_some()));
    }

    #[test]
    fn test_node_limit_zero_returns_greedy_schedule() {
        let (model, starts, makespan) = sample();
        let config = SolverConfig::default().with_node_limit(0);

        let solution = BranchAndBoundSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert_eq!(solution.branches, 0);
        let objective = solution.value(makespan).unwrap();
        assert!(objective >= 11);
        assert_eq!(solution.objective_value, Some(objective as f64));
        assert!(starts.iter().all(|&s| solution.value(s).is_some()));
    }

    #[test]
    fn test_node_limit_zero_without_objective_is_unknown() {
        let (mut model, _, _) = sample();
        model.objective = None;
        let config = SolverConfig::default().with_node_limit(0);

        let solution = BranchAndBoundSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolverStatus::Unknown);
        assert!(!solution.is_solution_found());
    }

    #[test]
    fn test_greedy_dives_respect_machines() {
        let (model, _, _) = sample();
        let problem = Problem::compile(&model).unwrap();

        let mwr = problem.greedy(Priority::MostWorkRemaining).unwrap();
        let spt = problem.greedy(Priority::ShortestProcessing).unwrap();
        let best = problem.upper_bound().unwrap();
        assert_eq!(best.objective, mwr.objective.min(spt.objective));
        assert!(best.objective >= 11);

        // Every pair sharing a machine is disjoint.
        for i in 0..problem.len() {
            for j in (i + 1)..problem.len() {
                if problem.shares_group(i, j) {
                    let (si, sj) = (best.starts[i], best.starts[j]);
                    assert!(
                        si + problem.duration[i] <= sj || sj + problem.duration[j] <= si,
                        "intervals {i} and {j} overlap"
                    );
                }
            }
        }
    }

    #[test]
    fn test_upper_bound_needs_objective() {
        let (mut model, _, _) = sample();
        model.objective = None;
        let problem = Problem::compile(&model).unwrap();
        assert!(problem.upper_bound().is_none());
    }

    #[test]
    fn test_one_machine_bound_uses_late_heads() {
        // Two 5-long tasks on machine 0 cannot start before 10.
        let (model, _, _) = job_shop(&[&[(1, 10), (0, 5)], &[(2, 10), (0, 5)], &[(0, 1)]]);
        let problem = Problem::compile(&model).unwrap();
        let root = problem.root();
        let head = problem.heads(&root).unwrap();
        assert_eq!(problem.lower_bound(&root, &head), 20);

        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(20.0));
    }

    #[test]
    fn test_node_limit_keeps_incumbent() {
        let (model, _, _) = sample();
        // The first dive places all eight tasks and records a schedule.
        let config = SolverConfig::default().with_node_limit(9);

        let solution = BranchAndBoundSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert_eq!(solution.objective_value, Some(11.0));
    }

    #[test]
    fn test_workers_agree_with_single_worker() {
        let (model, _, _) = sample();
        let single = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default().with_seed(10));

        for workers in [2, 3, 4] {
            for seed in [0, 10, 12345] {
                let config = SolverConfig::default().with_seed(seed).with_workers(workers);
                let solution = BranchAndBoundSolver::new().solve(&model, &config);
                assert_eq!(solution.status, SolverStatus::Optimal);
                assert_eq!(solution.objective_value, single.objective_value);
                assert_eq!(solution.values, single.values, "workers={workers} seed={seed}");
            }
        }
    }

    #[test]
    fn test_repeated_solves_are_identical() {
        let (model, _, _) = job_shop(&[
            &[(2, 1), (0, 3), (1, 6), (3, 7)],
            &[(1, 8), (2, 5), (3, 10), (0, 4)],
            &[(2, 5), (3, 4), (0, 8), (1, 9)],
            &[(1, 5), (0, 5), (2, 5), (3, 3)],
        ]);
        let config = SolverConfig::default().with_seed(7).with_workers(3);
        let first = BranchAndBoundSolver::new().solve(&model, &config);
        assert!(first.is_solution_found());

        for _ in 0..3 {
            let again = BranchAndBoundSolver::new().solve(&model, &config);
            assert_eq!(again.status, first.status);
            assert_eq!(again.objective_value, first.objective_value);
            assert_eq!(again.values, first.values);
        }
    }

    #[test]
    fn test_topological_order_detects_cycle() {
        let preds = vec![vec![(1, 0)], vec![(0, 0)]];
        let succs = vec![vec![(1, 0)], vec![(0, 0)]];
        assert!(topological_order(&preds, &succs).is_none());

        let preds = vec![vec![], vec![(0, 0)]];
        let succs = vec![vec![(1, 0)], vec![]];
        assert_eq!(topological_order(&preds, &succs), Some(vec![0, 1]));
    }
}
