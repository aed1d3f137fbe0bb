/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Constraint model construction.
//!
//! [`ModelBuilder`] turns session requests into a [`Problem`] for the solver:
//!
//! * one boolean variable per (request, day, period, room) where the room
//!   accepts the request,
//! * **assignment**: every request with variables is placed exactly once,
//! * **room / teacher / batch exclusivity**: at most one session per entity
//!   per (day, period),
//! * optionally the **consecutive-session cap** (break-aware, see
//!   [`window`]) and **teacher load caps**.
//!
//! Exclusivity constraints are built by bucketing variables by (day, period)
//! once and sub-grouping each bucket by room, teacher and batch, so no
//! constraint family re-scans the full variable list.

pub mod window;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::EngineSettings;
use crate::scheduler::error::DropReason;
use crate::scheduler::requests::SessionRequest;
use crate::solver::{LinearConstraint, Problem, VarId};

use window::capped_windows;

// ── Public types ──────────────────────────────────────────────────────────────

/// What a decision variable means.  All indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarKey {
    /// Index into the request list.
    pub request: usize,
    pub day: usize,
    pub period: usize,
    /// Index into `catalog.classrooms`.
    pub room: usize,
}

/// Number of constraints per family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintCounts {
    pub assignment: usize,
    pub room: usize,
    pub teacher: usize,
    pub batch: usize,
    pub consecutive: usize,
    pub teacher_load: usize,
}

impl ConstraintCounts {
    pub fn total(&self) -> usize {
        self.assignment + self.room + self.teacher + self.batch + self.consecutive + self.teacher_load
    }
}

/// The built model plus the bookkeeping needed to read a solution back.
#[derive(Debug, Clone, Default)]
pub struct TimetableModel {
    pub problem: Problem,
    /// `keys[v]` describes variable `v`.
    pub keys: Vec<VarKey>,
    /// Variables of each request (empty = the request is not in the model).
    pub request_vars: Vec<Vec<VarId>>,
    /// Rooms that accept each request, as classroom indices.
    pub request_rooms: Vec<Vec<usize>>,
    /// Requests left out of the model, and why.
    pub dropped: Vec<DropReason>,
    pub counts: ConstraintCounts,
}

impl TimetableModel {
    /// `true` if `request` has at least one variable.
    pub fn is_placeable(&self, request: usize) -> bool {
        self.request_vars
            .get(request)
            .is_some_and(|vars| !vars.is_empty())
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Per-entity, per-day variable lists indexed by period.
type DayLanes = BTreeMap<(usize, usize), Vec<Vec<VarId>>>;

pub struct ModelBuilder<'a> {
    catalog: &'a Catalog,
    requests: &'a [SessionRequest],
    settings: &'a EngineSettings,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(
        catalog: &'a Catalog,
        requests: &'a [SessionRequest],
        settings: &'a EngineSettings,
    ) -> Self {
        Self {
            catalog,
            requests,
            settings,
        }
    }

    /// Build the model.
    pub fn build(&self) -> TimetableModel {
        let mut model = TimetableModel::default();

        self.create_variables(&mut model);
        self.add_assignment_constraints(&mut model);

        let (teacher_lanes, batch_lanes) = self.add_exclusivity_constraints(&mut model);

        if let Some(limit) = self.settings.consecutive_limit {
            let scope = self.settings.consecutive_scope;
            if scope.covers_batches() {
                Self::add_consecutive_cap(&mut model, &batch_lanes, limit, self.break_after());
            }
            if scope.covers_teachers() {
                Self::add_consecutive_cap(&mut model, &teacher_lanes, limit, self.break_after());
            }
        }

        if self.settings.enforce_teacher_load {
            self.add_teacher_load_caps(&mut model, &teacher_lanes);
        }

        info!(
            variables = model.problem.num_vars(),
            constraints = model.counts.total(),
            assignment = model.counts.assignment,
            room = model.counts.room,
            teacher = model.counts.teacher,
            batch = model.counts.batch,
            consecutive = model.counts.consecutive,
            teacher_load = model.counts.teacher_load,
            dropped = model.dropped.len(),
            "model built"
        );
        model
    }

    fn break_after(&self) -> Option<u32> {
        self.catalog.config.break_after
    }

    fn create_variables(&self, model: &mut TimetableModel) {
        let cfg = &self.catalog.config;
        let filter = self.settings.room_filter;

        for req in self.requests {
            let batch = &self.catalog.batches[req.batch];
            let subject = &self.catalog.subjects[req.subject];
            let teacher = &self.catalog.teachers[req.teacher];

            let rooms: Vec<usize> = self
                .catalog
                .classrooms
                .iter()
                .enumerate()
                .filter(|(_, room)| room.accepts(req.session_type, batch.size, filter))
                .map(|(i, _)| i)
                .collect();

            let mut vars = Vec::new();
            if rooms.is_empty() {
                let reason = DropReason::NoCompatibleRoom {
                    batch: batch.id.clone(),
                    subject: subject.id.clone(),
                    request: req.id,
                };
                warn!("{}", reason);
                model.dropped.push(reason);
            } else {
                for (d, day) in cfg.days_per_week.iter().enumerate() {
                    for p in 0..cfg.periods() {
                        if self.settings.honor_unavailable_slots
                            && teacher.is_unavailable(day, p as u32 + 1)
                        {
                            continue;
                        }
                        for &room in &rooms {
                            let var = model.problem.new_var();
                            model.keys.push(VarKey {
                                request: req.id,
                                day: d,
                                period: p,
                                room,
                            });
                            vars.push(var);
                        }
                    }
                }
                if vars.is_empty() {
                    let reason = DropReason::TeacherUnavailable {
                        teacher: teacher.id.clone(),
                        request: req.id,
                    };
                    warn!("{}", reason);
                    model.dropped.push(reason);
                }
            }

            model.request_rooms.push(rooms);
            model.request_vars.push(vars);
        }
    }

    fn add_assignment_constraints(&self, model: &mut TimetableModel) {
        for vars in &model.request_vars {
            if !vars.is_empty() {
                model
                    .problem
                    .add_constraint(LinearConstraint::exactly(vars.clone(), 1));
                model.counts.assignment += 1;
            }
        }
    }

    /// Room, teacher and batch exclusivity.  Returns the per-(teacher, day)
    /// and per-(batch, day) lanes for the optional constraint families.
    fn add_exclusivity_constraints(&self, model: &mut TimetableModel) -> (DayLanes, DayLanes) {
        let periods = self.catalog.config.periods();
        let slot_count = self.catalog.config.slot_count();

        let mut by_slot: Vec<Vec<VarId>> = vec![Vec::new(); slot_count];
        for (var, key) in model.keys.iter().enumerate() {
            by_slot[key.day * periods + key.period].push(var);
        }

        let mut teacher_lanes = DayLanes::new();
        let mut batch_lanes = DayLanes::new();

        for (slot, vars) in by_slot.iter().enumerate() {
            if vars.is_empty() {
                continue;
            }
            let (day, period) = (slot / periods, slot % periods);

            let mut rooms: BTreeMap<usize, Vec<VarId>> = BTreeMap::new();
            let mut teachers: BTreeMap<usize, Vec<VarId>> = BTreeMap::new();
            let mut batches: BTreeMap<usize, Vec<VarId>> = BTreeMap::new();
            for &var in vars {
                let key = model.keys[var];
                let req = &self.requests[key.request];
                rooms.entry(key.room).or_default().push(var);
                teachers.entry(req.teacher).or_default().push(var);
                batches.entry(req.batch).or_default().push(var);
            }

            model.counts.room += Self::add_at_most_one(&mut model.problem, rooms.values());
            model.counts.teacher += Self::add_at_most_one(&mut model.problem, teachers.values());
            model.counts.batch += Self::add_at_most_one(&mut model.problem, batches.values());

            for (teacher, tv) in teachers {
                teacher_lanes
                    .entry((teacher, day))
                    .or_insert_with(|| vec![Vec::new(); periods])[period] = tv;
            }
            for (batch, bv) in batches {
                batch_lanes
                    .entry((batch, day))
                    .or_insert_with(|| vec![Vec::new(); periods])[period] = bv;
            }
        }

        (teacher_lanes, batch_lanes)
    }

    /// `Σ group ≤ 1` for every group with more than one variable.
    fn add_at_most_one<'g>(
        problem: &mut Problem,
        groups: impl Iterator<Item = &'g Vec<VarId>>,
    ) -> usize {
        let mut added = 0;
        for group in groups.filter(|g| g.len() > 1) {
            problem.add_constraint(LinearConstraint::at_most(group.clone(), 1));
            added += 1;
        }
        added
    }

    /// No window of `limit + 1` consecutive periods holds more than `limit`
    /// sessions of one entity, except windows that straddle the break.
    fn add_consecutive_cap(
        model: &mut TimetableModel,
        lanes: &DayLanes,
        limit: u32,
        break_after: Option<u32>,
    ) {
        for lane in lanes.values() {
            for window in capped_windows(lane.len(), limit, break_after) {
                let busy_periods = lane[window.clone()].iter().filter(|v| !v.is_empty()).count();
                // Per-period exclusivity already bounds the window sum by the
                // number of periods that have variables at all.
                if busy_periods as u32 <= limit {
                    continue;
                }
                let vars: Vec<VarId> = lane[window].iter().flatten().copied().collect();
                model
                    .problem
                    .add_constraint(LinearConstraint::at_most(vars, limit));
                model.counts.consecutive += 1;
            }
        }
    }

    /// Per-teacher daily and weekly caps from the catalog (`0` = unlimited).
    fn add_teacher_load_caps(&self, model: &mut TimetableModel, teacher_lanes: &DayLanes) {
        let mut weekly: BTreeMap<usize, (usize, Vec<VarId>)> = BTreeMap::new();

        for (&(t_idx, _day), lane) in teacher_lanes {
            let teacher = &self.catalog.teachers[t_idx];
            let busy_periods = lane.iter().filter(|v| !v.is_empty()).count();
            let vars: Vec<VarId> = lane.iter().flatten().copied().collect();

            let entry = weekly.entry(t_idx).or_default();
            entry.0 += busy_periods;
            entry.1.extend_from_slice(&vars);

            let cap = teacher.max_load_per_day;
            if cap > 0 && busy_periods as u32 > cap {
                model
                    .problem
                    .add_constraint(LinearConstraint::at_most(vars, cap));
                model.counts.teacher_load += 1;
            }
        }

        for (t_idx, (busy_slots, vars)) in weekly {
            let teacher = &self.catalog.teachers[t_idx];
            let cap = teacher.max_load_per_week;
            if cap > 0 && busy_slots as u32 > cap {
                debug!(teacher = %teacher.id, cap, "weekly load cap added");
                model
                    .problem
                    .add_constraint(LinearConstraint::at_most(vars, cap));
                model.counts.teacher_load += 1;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
