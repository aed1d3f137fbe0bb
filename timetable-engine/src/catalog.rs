/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Catalog data structures consumed by the timetable engine.
//!
//! The catalog is an immutable snapshot supplied by an external loader:
//!
//! ```text
//! Catalog JSON  ──►  Catalog  ──(requests)──►  SessionRequest  ──(model/solver)──►  ScheduleEntry
//!                    ↑ input                    ↑ derived, per solve                ↑ output
//! ```
//!
//! Field names follow the camelCase JSON layout used by the catalog producer
//! (`qualifiedSubjects`, `slotsPerDay`, ...).  Unknown top-level fields such
//! as a previously saved `schedule` array are ignored.
//!
//! # Ownership model
//! The engine only ever borrows a `Catalog`.  Everything derived from it
//! (requests, model, solver state) is local to a single solve call.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::RoomFilter;
use crate::scheduler::EngineError;

// ── Session type ──────────────────────────────────────────────────────────────

/// Kind of teaching session; also the kind of room that can host it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum SessionType {
    /// Lecture-style session, hosted in a regular classroom.
    #[default]
    Theory,
    /// Practical session, hosted in a laboratory.
    Lab,
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionType::Theory => write!(f, "Theory"),
            SessionType::Lab => write!(f, "Lab"),
        }
    }
}

// ── Time slot ─────────────────────────────────────────────────────────────────

/// A (day, period) pair as it appears in teacher availability lists.
///
/// `period` is 1-based, matching the external numbering of the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: String,
    pub period: u32,
}

// ── Subject ───────────────────────────────────────────────────────────────────

/// A subject that batches take for `credits` one-period sessions per week.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub code: String,

    #[serde(rename = "type", default)]
    pub session_type: SessionType,

    /// Number of one-period sessions per week.
    #[serde(default = "default_credits")]
    pub credits: u32,

    /// Batches allowed to take this subject.  Absent or empty = unrestricted.
    #[serde(default)]
    pub required_batches: Option<Vec<String>>,
}

fn default_credits() -> u32 {
    1
}

impl Subject {
    /// Returns `true` if the subject-side restriction admits `batch_id`.
    pub fn admits_batch(&self, batch_id: &str) -> bool {
        match &self.required_batches {
            Some(list) if !list.is_empty() => list.iter().any(|b| b == batch_id),
            _ => true,
        }
    }
}

// ── Teacher ───────────────────────────────────────────────────────────────────

/// A teacher and the subjects they are qualified for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub department: String,

    #[serde(default)]
    pub qualified_subjects: Vec<String>,

    /// Maximum sessions per day.  `0` = unlimited.
    ///
    /// Only enforced when `enforce_teacher_load` is switched on.
    #[serde(default)]
    pub max_load_per_day: u32,

    /// Maximum sessions per week.  `0` = unlimited.
    #[serde(default)]
    pub max_load_per_week: u32,

    /// Carried through for downstream consumers; never constrained.
    #[serde(default)]
    pub preferred_slots: Vec<TimeSlot>,

    /// Only honoured when `honor_unavailable_slots` is switched on.
    #[serde(default)]
    pub unavailable_slots: Vec<TimeSlot>,
}

impl Teacher {
    pub fn is_qualified_for(&self, subject_id: &str) -> bool {
        self.qualified_subjects.iter().any(|s| s == subject_id)
    }

    /// `true` if the teacher declared `(day, period)` as unavailable.
    /// `period` is 1-based.
    pub fn is_unavailable(&self, day: &str, period: u32) -> bool {
        self.unavailable_slots
            .iter()
            .any(|s| s.day == day && s.period == period)
    }
}

// ── Batch ─────────────────────────────────────────────────────────────────────

/// A group of students that attends every session together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Headcount, compared against room capacity.
    #[serde(default)]
    pub size: u32,

    #[serde(default)]
    pub department: String,

    /// Subjects this batch takes.  Absent or empty = every subject.
    #[serde(default)]
    pub required_subjects: Option<Vec<String>>,
}

impl Batch {
    /// Returns `true` if the batch-side restriction admits `subject_id`.
    pub fn takes_subject(&self, subject_id: &str) -> bool {
        match &self.required_subjects {
            Some(list) if !list.is_empty() => list.iter().any(|s| s == subject_id),
            _ => true,
        }
    }
}

// ── Classroom ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub capacity: u32,

    #[serde(rename = "type", default)]
    pub session_type: SessionType,
}

impl Classroom {
    /// Whether this room may host a `session_type` session for `batch_size`
    /// students under the given filter.
    pub fn accepts(&self, session_type: SessionType, batch_size: u32, filter: RoomFilter) -> bool {
        match filter {
            RoomFilter::Strict => self.session_type == session_type && self.capacity >= batch_size,
            RoomFilter::TypeOnly => self.session_type == session_type,
            RoomFilter::Any => true,
        }
    }
}

// ── Week configuration ────────────────────────────────────────────────────────

/// Shape of the teaching week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekConfig {
    /// Ordered day names; output entries carry these strings verbatim.
    #[serde(default = "default_days")]
    pub days_per_week: Vec<String>,

    #[serde(default = "default_slots_per_day")]
    pub slots_per_day: u32,

    /// 1-based period after which the break falls (between `break_after` and
    /// `break_after + 1`).  `None` = no break.
    #[serde(default)]
    pub break_after: Option<u32>,
}

fn default_days() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

fn default_slots_per_day() -> u32 {
    6
}

impl Default for WeekConfig {
    fn default() -> Self {
        Self {
            days_per_week: default_days(),
            slots_per_day: default_slots_per_day(),
            break_after: None,
        }
    }
}

impl WeekConfig {
    pub fn day_count(&self) -> usize {
        self.days_per_week.len()
    }

    pub fn periods(&self) -> usize {
        self.slots_per_day as usize
    }

    /// Total number of (day, period) slots in the week.
    pub fn slot_count(&self) -> usize {
        self.day_count() * self.periods()
    }

    /// Check the shape invariants: at least one day, distinct day names, at
    /// least one period, and `break_after` (when set) within
    /// `1..=slots_per_day`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.days_per_week.is_empty() {
            return Err(EngineError::InvalidConfig(
                "daysPerWeek must name at least one day".to_string(),
            ));
        }
        if self.slots_per_day == 0 {
            return Err(EngineError::InvalidConfig(
                "slotsPerDay must be a positive integer".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(day) = self.days_per_week.iter().find(|d| !seen.insert(d.as_str())) {
            return Err(EngineError::InvalidConfig(format!(
                "daysPerWeek names '{}' more than once",
                day
            )));
        }
        if let Some(b) = self.break_after {
            if b == 0 || b > self.slots_per_day {
                return Err(EngineError::InvalidConfig(format!(
                    "breakAfter {} must lie within 1..={}",
                    b, self.slots_per_day
                )));
            }
        }
        Ok(())
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

/// One immutable snapshot of everything the engine needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub classrooms: Vec<Classroom>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub config: WeekConfig,
}

impl Catalog {
    /// Parse a catalog document.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Validate the week shape and reject duplicate identities within each
    /// entity list.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.config.validate()?;
        check_unique("teacher", self.teachers.iter().map(|t| t.id.as_str()))?;
        check_unique("classroom", self.classrooms.iter().map(|r| r.id.as_str()))?;
        check_unique("subject", self.subjects.iter().map(|s| s.id.as_str()))?;
        check_unique("batch", self.batches.iter().map(|b| b.id.as_str()))?;
        Ok(())
    }
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(EngineError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
