/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetable engine pipeline.
//!
//! [`TimetableEngine`] runs one solve over an immutable [`Catalog`] snapshot:
//!
//! ```text
//! Catalog ─► requests ─► ModelBuilder ─► capacity check ─► dyn Solver
//!                                                              │
//!            Timetable { entries, report } ◄─ gap fill ◄─ extractor
//! ```
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless `solve()`: teacher tally, model and occupancy are local to the call |
//! | Iteration order | Catalog order and `BTreeMap` grouping, so equal inputs give equal output |
//! | Solver | Injected `Box<dyn Solver>`; [`BacktrackingSolver`] by default |
//! | Infeasible / timeout | Empty schedule plus a report, never an error |
//! | Degradation | Every dropped pair, unplaceable request and residual gap is counted in [`SolveReport`] |
//!
//! # Example
//! ```rust,ignore
//! let engine = TimetableEngine::new(EngineSettings::default());
//! let timetable = engine.solve(&catalog)?;
//! println!("{}", serde_json::to_string(&timetable.entries)?);
//! ```

pub mod error;
pub mod feasibility;
pub mod gap_fill;
pub mod requests;

pub use error::{DropReason, EngineError};

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::EngineSettings;
use crate::model::{ConstraintCounts, ModelBuilder};
use crate::schedule::{extract_entries, ScheduleEntry};
use crate::solver::{
    BacktrackingSolver, CancelFlag, SolveBudget, SolveStatus, Solver, SolverOutcome,
};

use feasibility::check_capacity;
use gap_fill::fill_gaps;
use requests::{generate_requests, TeacherLoad};

// ── Report ────────────────────────────────────────────────────────────────────

/// Counts describing one solve, including everything that was silently
/// degraded along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveReport {
    pub solver: String,
    pub status: Option<SolveStatus>,
    pub requests_generated: usize,
    /// (batch, subject) pairs left out because no teacher exists.
    pub pairs_without_teacher: usize,
    /// Requests that reached the model builder but received no variable.
    pub requests_unplaceable: usize,
    /// Human-readable reason for every drop above.
    pub drops: Vec<String>,
    pub variables: usize,
    pub constraints: ConstraintCounts,
    /// Non-empty only when the capacity check ruled the model out.
    pub capacity_violations: Vec<String>,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub scheduled_sessions: usize,
    pub filler_entries: usize,
    pub unsupervised_fillers: usize,
    pub residual_gaps: usize,
}

/// Output of one solve.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    /// Placed sessions followed by filler entries.  Empty unless the model
    /// was solved.
    pub entries: Vec<ScheduleEntry>,
    pub report: SolveReport,
}

impl Timetable {
    pub fn status(&self) -> Option<SolveStatus> {
        self.report.status
    }
}

// ── TimetableEngine ───────────────────────────────────────────────────────────

/// The scheduling engine.
///
/// Holds only settings and the solver backend; every solve allocates its own
/// working state, so one engine can serve concurrent callers.
pub struct TimetableEngine {
    settings: EngineSettings,
    solver: Box<dyn Solver>,
}

impl TimetableEngine {
    /// Engine backed by the built-in [`BacktrackingSolver`].
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_solver(settings, Box::new(BacktrackingSolver))
    }

    pub fn with_solver(settings: EngineSettings, solver: Box<dyn Solver>) -> Self {
        Self { settings, solver }
    }

    /// Solve `catalog` without an external cancellation source.
    pub fn solve(&self, catalog: &Catalog) -> Result<Timetable, EngineError> {
        self.solve_with_cancel(catalog, CancelFlag::new())
    }

    /// Solve `catalog`; flipping `cancel` ends the search with
    /// [`SolveStatus::Unknown`].
    ///
    /// # Errors
    /// [`EngineError::InvalidConfig`] / [`EngineError::DuplicateId`] for an
    /// unusable catalog, [`EngineError::Solver`] if the backend itself fails
    /// or hands back an assignment of the wrong length.
    /// Infeasible and timed-out solves return `Ok` with an empty schedule.
    pub fn solve_with_cancel(
        &self,
        catalog: &Catalog,
        cancel: CancelFlag,
    ) -> Result<Timetable, EngineError> {
        // ── Preconditions ─────────────────────────────────────────────────────
        catalog.validate()?;

        let started = Instant::now();
        let mut report = SolveReport {
            solver: self.solver.name().to_string(),
            ..Default::default()
        };

        info!(
            solver = self.solver.name(),
            batches = catalog.batches.len(),
            subjects = catalog.subjects.len(),
            teachers = catalog.teachers.len(),
            classrooms = catalog.classrooms.len(),
            days = catalog.config.day_count(),
            slots_per_day = catalog.config.slots_per_day,
            "=== TimetableEngine::solve() ==="
        );

        // ── Requests ──────────────────────────────────────────────────────────
        let mut load = TeacherLoad::new();
        let generated = generate_requests(catalog, &mut load);
        let requests = generated.requests;
        for (teacher, credits) in load.iter() {
            debug!(teacher, credits, "teacher load after assignment");
        }
        report.requests_generated = requests.len();
        report.pairs_without_teacher = generated.dropped.len();

        // ── Model ─────────────────────────────────────────────────────────────
        let model = ModelBuilder::new(catalog, &requests, &self.settings).build();
        report.requests_unplaceable = model.dropped.len();
        report.drops = generated
            .dropped
            .iter()
            .chain(&model.dropped)
            .map(ToString::to_string)
            .collect();
        report.variables = model.problem.num_vars();
        report.constraints = model.counts;

        // ── Capacity pre-check ────────────────────────────────────────────────
        let violations = check_capacity(catalog, &requests, &model, &self.settings);
        let outcome = if violations.is_empty() {
            let budget = SolveBudget::new(self.settings.time_limit).with_cancel(cancel);
            let outcome = self
                .solver
                .solve(&model.problem, &budget)
                .map_err(|e| EngineError::Solver(e.to_string()))?;
            let num_vars = model.problem.num_vars();
            if outcome.status.has_solution() && outcome.values.len() != num_vars {
                return Err(EngineError::Solver(format!(
                    "backend '{}' returned {} value(s) for {} variable(s)",
                    self.solver.name(),
                    outcome.values.len(),
                    num_vars
                )));
            }
            outcome
        } else {
            for v in &violations {
                warn!("capacity check failed: {}", v);
            }
            report.capacity_violations = violations.iter().map(ToString::to_string).collect();
            SolverOutcome::without_solution(SolveStatus::Infeasible, 0, started.elapsed())
        };

        report.status = Some(outcome.status);
        report.nodes = outcome.nodes;

        // ── Extraction and gap filling ────────────────────────────────────────
        let mut entries = extract_entries(catalog, &requests, &model, &outcome);
        report.scheduled_sessions = entries.len();

        if outcome.status.has_solution() {
            if self.settings.gap_filler_enabled {
                let summary = fill_gaps(catalog, &mut entries);
                report.filler_entries = summary.filled;
                report.unsupervised_fillers = summary.unsupervised;
                report.residual_gaps = summary.residual_gaps;
            }
        } else {
            warn!(
                status = %outcome.status,
                nodes = outcome.nodes,
                "no timetable found, returning an empty schedule"
            );
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            status = %outcome.status,
            scheduled = report.scheduled_sessions,
            fillers = report.filler_entries,
            residual_gaps = report.residual_gaps,
            unplaceable = report.requests_unplaceable + report.pairs_without_teacher,
            elapsed_ms = report.elapsed_ms,
            "solve finished"
        );

        Ok(Timetable { entries, report })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
