/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the timetable engine.
//!
//! Two types model the two failure layers:
//!
//! * [`DropReason`]: why a single (batch, subject) pair or session request
//!   was left out of the model.  Never fatal; collected into the
//!   [`SolveReport`](super::SolveReport).
//! * [`EngineError`]: top-level failure returned from
//!   [`TimetableEngine::solve()`](super::TimetableEngine::solve).
//!
//! An infeasible or timed-out model is **not** an `EngineError`: the engine
//! returns an empty schedule and says why in the report.

use thiserror::Error;

// ── Drops ─────────────────────────────────────────────────────────────────────

/// Reason a unit of demand never reached the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The catalog has no teachers at all, so the (batch, subject) pair could
    /// not be bound to anyone.
    NoTeachers { batch: String, subject: String },

    /// No classroom passes the room filter for this request.
    NoCompatibleRoom {
        batch: String,
        subject: String,
        request: usize,
    },

    /// Every slot in which a room would accept the request is one the
    /// teacher declared unavailable.
    TeacherUnavailable { teacher: String, request: usize },
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::NoTeachers { batch, subject } => write!(
                f,
                "subject '{}' for batch '{}' dropped: no teachers exist",
                subject, batch
            ),
            DropReason::NoCompatibleRoom {
                batch,
                subject,
                request,
            } => write!(
                f,
                "request #{} (subject '{}', batch '{}') has no compatible room",
                request, subject, batch
            ),
            DropReason::TeacherUnavailable { teacher, request } => write!(
                f,
                "request #{} has no slot left: teacher '{}' is unavailable in all of them",
                request, teacher
            ),
        }
    }
}

// ── Top-level engine errors ───────────────────────────────────────────────────

/// Top-level error type returned by
/// [`TimetableEngine::solve()`](super::TimetableEngine::solve).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The week configuration is unusable (no days, no periods, break out of
    /// range).
    #[error("invalid week configuration: {0}")]
    InvalidConfig(String),

    /// Two entities of the same kind share an identity.
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    /// The solver backend reported an internal failure (as opposed to a
    /// proven-infeasible or timed-out search).
    #[error("solver backend failure: {0}")]
    Solver(String),
}
