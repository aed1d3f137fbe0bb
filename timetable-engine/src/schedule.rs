/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Output records and the solution extractor.
//!
//! [`extract_entries`] reads the true variables of a solver outcome back into
//! wire-ready [`ScheduleEntry`] values: 0-based day / period indices become
//! the configured day name and a 1-based period number.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::model::TimetableModel;
use crate::scheduler::requests::SessionRequest;
use crate::solver::SolverOutcome;

/// One placed session (or filler activity) in the final timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub subject_id: String,
    pub teacher_id: String,
    pub classroom_id: String,
    /// Always a single batch in this model.
    pub batch_ids: Vec<String>,
    pub day: String,
    /// 1-based.
    pub period: u32,
}

impl ScheduleEntry {
    pub fn has_batch(&self, batch_id: &str) -> bool {
        self.batch_ids.iter().any(|b| b == batch_id)
    }
}

/// Build one entry per true variable.
///
/// Returns an empty list when the outcome carries no solution.
pub fn extract_entries(
    catalog: &Catalog,
    requests: &[SessionRequest],
    model: &TimetableModel,
    outcome: &SolverOutcome,
) -> Vec<ScheduleEntry> {
    if !outcome.status.has_solution() {
        return Vec::new();
    }

    let entries: Vec<ScheduleEntry> = outcome
        .true_vars()
        .map(|var| {
            let key = model.keys[var];
            let req = &requests[key.request];
            ScheduleEntry {
                id: format!("sched_{}", req.id),
                subject_id: catalog.subjects[req.subject].id.clone(),
                teacher_id: catalog.teachers[req.teacher].id.clone(),
                classroom_id: catalog.classrooms[key.room].id.clone(),
                batch_ids: vec![catalog.batches[req.batch].id.clone()],
                day: catalog.config.days_per_week[key.day].clone(),
                period: key.period as u32 + 1,
            }
        })
        .collect();

    debug!(entries = entries.len(), "solution extracted");
    entries
}

// ── Tests ─────────────────────────────────────────────────────────────────────
