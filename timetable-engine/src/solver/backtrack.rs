/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Built-in complete search backend.
//!
//! Depth-first search with binary branching (`x = 1`, then `x = 0`) over the
//! variables of equality constraints, and forward checking on the
//! constraint counters:
//!
//! * `count[c]`: variables of `c` currently set to true.
//! * `live[c]`: variables of `c` still unassigned and not blocked.
//! * `block[v]`: number of saturated constraints (`count == rhs`) that
//!   contain the unassigned variable `v`.  A blocked variable can only be
//!   false.
//!
//! An equality constraint with `count + live < rhs` can no longer be met,
//! which triggers a backtrack.  Branching picks the open equality constraint
//! with the fewest live variables (fail-first).  Variables that appear in no
//! equality constraint are never branched on and end up false.
//!
//! The decision stack and the undo trail are explicit vectors, so search
//! depth never touches the call stack.

use std::time::Instant;

use tracing::{debug, info};

use super::{
    LinearConstraint, Problem, Relation, SolveBudget, SolveStatus, Solver, SolverError,
    SolverOutcome, VarId,
};

/// Nodes between two deadline / cancellation checks.
const BUDGET_CHECK_INTERVAL: u64 = 1024;

/// Depth-first satisfaction search with forward checking.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingSolver;

impl BacktrackingSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for BacktrackingSolver {
    fn name(&self) -> &'static str {
        "backtracking"
    }

    fn solve(&self, problem: &Problem, budget: &SolveBudget) -> Result<SolverOutcome, SolverError> {
        problem.validate()?;

        let started = Instant::now();
        let deadline = started + budget.time_limit;

        info!(
            vars = problem.num_vars(),
            constraints = problem.constraints().len(),
            time_limit_ms = budget.time_limit.as_millis() as u64,
            "backtracking search started"
        );

        if budget.cancel.is_cancelled() {
            return Ok(SolverOutcome::without_solution(
                SolveStatus::Unknown,
                0,
                started.elapsed(),
            ));
        }

        let var_cons = index_constraints(problem);
        let mut state = SearchState::new(problem, &var_cons);

        if !state.propagate_root() {
            debug!("root propagation failed");
            return Ok(SolverOutcome::without_solution(
                SolveStatus::Infeasible,
                0,
                started.elapsed(),
            ));
        }

        let mut decisions: Vec<Decision> = Vec::new();
        let mut nodes: u64 = 0;

        loop {
            nodes += 1;
            if nodes % BUDGET_CHECK_INTERVAL == 0 {
                if budget.cancel.is_cancelled() {
                    info!(nodes, "search cancelled");
                    return Ok(SolverOutcome::without_solution(
                        SolveStatus::Unknown,
                        nodes,
                        started.elapsed(),
                    ));
                }
                if Instant::now() >= deadline {
                    info!(nodes, "search hit its time limit");
                    return Ok(SolverOutcome::without_solution(
                        SolveStatus::Timeout,
                        nodes,
                        started.elapsed(),
                    ));
                }
            }

            let Some(var) = state.select_branch() else {
                let values = state.solution();
                debug_assert!(problem.is_satisfied_by(&values));
                info!(
                    nodes,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "solution found"
                );
                return Ok(SolverOutcome {
                    status: SolveStatus::Feasible,
                    values,
                    nodes,
                    elapsed: started.elapsed(),
                });
            };

            let mark = state.trail.len();
            decisions.push(Decision {
                var,
                mark,
                negated: false,
            });
            if state.assign_true(var) {
                continue;
            }

            // Conflict: unwind until a decision can be flipped to false.
            loop {
                let Some(d) = decisions.pop() else {
                    info!(nodes, "search space exhausted – infeasible");
                    return Ok(SolverOutcome::without_solution(
                        SolveStatus::Infeasible,
                        nodes,
                        started.elapsed(),
                    ));
                };
                state.undo_to(d.mark);
                if d.negated {
                    continue;
                }
                decisions.push(Decision {
                    var: d.var,
                    mark: d.mark,
                    negated: true,
                });
                if state.assign_false(d.var) {
                    break;
                }
            }
        }
    }
}

// ── Search internals ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Decision {
    var: VarId,
    /// Trail length before the decision was applied.
    mark: usize,
    /// `true` once the `x = 0` branch is being explored.
    negated: bool,
}

#[derive(Debug, Clone, Copy)]
enum TrailEntry {
    Assigned(VarId, bool),
    Blocked(VarId),
}

/// variable → constraints containing it.
fn index_constraints(problem: &Problem) -> Vec<Vec<usize>> {
    let mut var_cons = vec![Vec::new(); problem.num_vars()];
    for (c, constraint) in problem.constraints().iter().enumerate() {
        for &v in &constraint.vars {
            var_cons[v].push(c);
        }
    }
    var_cons
}

struct SearchState<'a> {
    constraints: &'a [LinearConstraint],
    var_cons: &'a [Vec<usize>],
    /// Indices of equality constraints, the only ones that drive branching.
    eq_constraints: Vec<usize>,
    value: Vec<Option<bool>>,
    count: Vec<u32>,
    live: Vec<u32>,
    block: Vec<u32>,
    trail: Vec<TrailEntry>,
    touched: Vec<usize>,
}

impl<'a> SearchState<'a> {
    fn new(problem: &'a Problem, var_cons: &'a [Vec<usize>]) -> Self {
        let constraints = problem.constraints();
        Self {
            constraints,
            var_cons,
            eq_constraints: constraints
                .iter()
                .enumerate()
                .filter(|(_, c)| c.relation == Relation::Eq)
                .map(|(i, _)| i)
                .collect(),
            value: vec![None; problem.num_vars()],
            count: vec![0; constraints.len()],
            live: constraints.iter().map(|c| c.vars.len() as u32).collect(),
            block: vec![0; problem.num_vars()],
            trail: Vec::new(),
            touched: Vec::new(),
        }
    }

    /// Block every variable of constraints that are saturated before any
    /// decision (`rhs == 0`), then check all equality constraints.
    fn propagate_root(&mut self) -> bool {
        let constraints = self.constraints;
        for c in constraints.iter().filter(|c| c.rhs == 0) {
            for &u in &c.vars {
                if self.value[u].is_none() {
                    self.block_var(u);
                }
            }
        }
        self.touched.clear();
        self.touched.extend(self.eq_constraints.iter().copied());
        self.check_touched()
    }

    fn block_var(&mut self, u: VarId) {
        let var_cons = self.var_cons;
        self.block[u] += 1;
        self.trail.push(TrailEntry::Blocked(u));
        if self.block[u] == 1 {
            for &c in &var_cons[u] {
                self.live[c] -= 1;
                self.touched.push(c);
            }
        }
    }

    fn is_live(&self, v: VarId) -> bool {
        self.value[v].is_none() && self.block[v] == 0
    }

    /// Set `v` (live) to true and propagate saturation.  Returns `false` on
    /// conflict; the caller undoes the trail.
    fn assign_true(&mut self, v: VarId) -> bool {
        let constraints = self.constraints;
        let var_cons = self.var_cons;

        self.value[v] = Some(true);
        self.trail.push(TrailEntry::Assigned(v, true));
        self.touched.clear();

        for &c in &var_cons[v] {
            self.live[c] -= 1;
            self.count[c] += 1;
            self.touched.push(c);
        }
        for &c in &var_cons[v] {
            if self.count[c] == constraints[c].rhs {
                for &u in &constraints[c].vars {
                    if self.value[u].is_none() {
                        self.block_var(u);
                    }
                }
            }
        }
        self.check_touched()
    }

    /// Set `v` (live) to false.
    fn assign_false(&mut self, v: VarId) -> bool {
        let var_cons = self.var_cons;
        self.value[v] = Some(false);
        self.trail.push(TrailEntry::Assigned(v, false));
        self.touched.clear();
        for &c in &var_cons[v] {
            self.live[c] -= 1;
            self.touched.push(c);
        }
        self.check_touched()
    }

    fn check_touched(&self) -> bool {
        self.touched.iter().all(|&c| {
            let constraint = &self.constraints[c];
            match constraint.relation {
                Relation::Eq => self.count[c] + self.live[c] >= constraint.rhs,
                Relation::Le => self.count[c] <= constraint.rhs,
            }
        })
    }

    fn undo_to(&mut self, mark: usize) {
        let var_cons = self.var_cons;
        while self.trail.len() > mark {
            let Some(entry) = self.trail.pop() else {
                break;
            };
            match entry {
                TrailEntry::Assigned(v, was_true) => {
                    for &c in &var_cons[v] {
                        if was_true {
                            self.count[c] -= 1;
                        }
                        self.live[c] += 1;
                    }
                    self.value[v] = None;
                }
                TrailEntry::Blocked(u) => {
                    self.block[u] -= 1;
                    if self.block[u] == 0 {
                        for &c in &var_cons[u] {
                            self.live[c] += 1;
                        }
                    }
                }
            }
        }
    }

    /// Fail-first: the first live variable of the open equality constraint
    /// with the fewest live variables.  `None` once every equality
    /// constraint is met.
    fn select_branch(&self) -> Option<VarId> {
        let c = self
            .eq_constraints
            .iter()
            .copied()
            .filter(|&c| self.count[c] < self.constraints[c].rhs)
            .min_by_key(|&c| self.live[c])?;
        self.constraints[c]
            .vars
            .iter()
            .copied()
            .find(|&v| self.is_live(v))
    }

    fn solution(&self) -> Vec<bool> {
        self.value.iter().map(|v| *v == Some(true)).collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
