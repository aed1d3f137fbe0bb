/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Narrow solver interface.
//!
//! The model builder speaks only this vocabulary: boolean variables and
//! linear cardinality constraints (`Σ x_i = k` or `Σ x_i ≤ k`).  Any backend
//! that implements [`Solver`] can be plugged into the engine without touching
//! the model builder or the extractor.
//!
//! ```text
//! ModelBuilder ──► Problem ──► dyn Solver ──► SolverOutcome ──► extractor
//!                               ↑ SolveBudget (deadline + cancel flag)
//! ```
//!
//! The built-in backend is [`backtrack::BacktrackingSolver`].

pub mod backtrack;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

pub use backtrack::BacktrackingSolver;

/// Index of a boolean decision variable inside a [`Problem`].
pub type VarId = usize;

// ── Constraints ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `Σ vars == rhs`
    Eq,
    /// `Σ vars <= rhs`
    Le,
}

/// A unit-coefficient linear constraint over boolean variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub vars: Vec<VarId>,
    pub relation: Relation,
    pub rhs: u32,
}

impl LinearConstraint {
    pub fn exactly(vars: Vec<VarId>, rhs: u32) -> Self {
        Self {
            vars,
            relation: Relation::Eq,
            rhs,
        }
    }

    pub fn at_most(vars: Vec<VarId>, rhs: u32) -> Self {
        Self {
            vars,
            relation: Relation::Le,
            rhs,
        }
    }

    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        let sum = self
            .vars
            .iter()
            .filter(|&&v| values.get(v).copied().unwrap_or(false))
            .count() as u32;
        match self.relation {
            Relation::Eq => sum == self.rhs,
            Relation::Le => sum <= self.rhs,
        }
    }
}

// ── Problem ───────────────────────────────────────────────────────────────────

/// A pure satisfaction problem: variables plus constraints, no objective.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    num_vars: usize,
    constraints: Vec<LinearConstraint>,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh variable.
    pub fn new_var(&mut self) -> VarId {
        self.num_vars += 1;
        self.num_vars - 1
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Check that every constraint only references allocated variables.
    pub fn validate(&self) -> Result<(), SolverError> {
        for (idx, c) in self.constraints.iter().enumerate() {
            if let Some(&var) = c.vars.iter().find(|&&v| v >= self.num_vars) {
                return Err(SolverError::UnknownVariable {
                    constraint: idx,
                    var,
                    num_vars: self.num_vars,
                });
            }
        }
        Ok(())
    }

    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        values.len() == self.num_vars && self.constraints.iter().all(|c| c.is_satisfied_by(values))
    }
}

// ── Budget ────────────────────────────────────────────────────────────────────

/// Shared flag a caller flips to abandon an in-flight solve.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Limits a backend must enforce on its own.
#[derive(Debug, Clone)]
pub struct SolveBudget {
    pub time_limit: Duration,
    pub cancel: CancelFlag,
}

impl SolveBudget {
    pub fn new(time_limit: Duration) -> Self {
        Self {
            time_limit,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Proven best assignment (for satisfaction problems: any assignment).
    Optimal,
    /// Valid assignment found.
    Feasible,
    /// Proven that no assignment exists.
    Infeasible,
    /// Budget exhausted before a conclusion.
    Timeout,
    /// Search abandoned (cancelled) before a conclusion.
    Unknown,
}

impl SolveStatus {
    /// `true` if the outcome carries a usable assignment.
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Timeout => "TIMEOUT",
            SolveStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Result of one solver call.
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    pub status: SolveStatus,
    /// One entry per variable when `status.has_solution()`, empty otherwise.
    pub values: Vec<bool>,
    /// Search nodes explored (backend specific, informational).
    pub nodes: u64,
    pub elapsed: Duration,
}

impl SolverOutcome {
    /// An outcome that carries no assignment.
    pub fn without_solution(status: SolveStatus, nodes: u64, elapsed: Duration) -> Self {
        Self {
            status,
            values: Vec::new(),
            nodes,
            elapsed,
        }
    }

    /// Variables set to true, in index order.  Empty unless a solution exists.
    pub fn true_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| i)
    }
}

// ── Backend trait ─────────────────────────────────────────────────────────────

/// Failure of the backend itself, distinct from an infeasible problem.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("constraint #{constraint} references variable {var}, but the problem has {num_vars} variable(s)")]
    UnknownVariable {
        constraint: usize,
        var: VarId,
        num_vars: usize,
    },
}

/// A pluggable satisfaction backend.
///
/// Implementations must return within roughly `budget.time_limit` and must
/// observe `budget.cancel`.
pub trait Solver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, problem: &Problem, budget: &SolveBudget) -> Result<SolverOutcome, SolverError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_satisfaction() {
        let eq = LinearConstraint::exactly(vec![0, 1, 2], 1);
        let le = LinearConstraint::at_most(vec![0, 1], 1);
        assert!(eq.is_satisfied_by(&[false, true, false]));
        assert!(!eq.is_satisfied_by(&[true, true, false]));
        assert!(!eq.is_satisfied_by(&[false, false, false]));
        assert!(le.is_satisfied_by(&[false, false, true]));
        assert!(!le.is_satisfied_by(&[true, true, false]));
    }

    #[test]
    fn validate_rejects_unallocated_variables() {
        let mut p = Problem::new();
        let a = p.new_var();
        p.add_constraint(LinearConstraint::at_most(vec![a, 5], 1));
        let err = p.validate().unwrap_err();
        assert!(matches!(
            err,
            SolverError::UnknownVariable {
                constraint: 0,
                var: 5,
                num_vars: 1
            }
        ));
    }

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let budget = SolveBudget::new(Duration::from_secs(1)).with_cancel(flag.clone());
        assert!(!budget.cancel.is_cancelled());
        flag.cancel();
        assert!(budget.cancel.is_cancelled());
    }

    #[test]
    fn status_serialises_in_upper_case() {
        assert_eq!(
            serde_json::to_string(&SolveStatus::Infeasible).unwrap(),
            "\"INFEASIBLE\""
        );
        assert_eq!(SolveStatus::Timeout.to_string(), "TIMEOUT");
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Unknown.has_solution());
    }
}
