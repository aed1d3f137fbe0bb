/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Gap filling post-pass.
//!
//! After extraction, every (batch, day, period) that has no entry gets a
//! filler activity in the first free room, supervised by the first free
//! teacher (or by nobody).  One deterministic sweep: batches in catalog
//! order, then days, then periods.  Occupancy is updated as fillers are
//! placed, so later gaps see earlier fillers.
//!
//! A gap with no free room stays open and is counted as residual.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::schedule::ScheduleEntry;

/// Subject id carried by filler entries (unstructured / self-study time).
pub const FILLER_SUBJECT_ID: &str = "FREE_PERIOD";

/// Teacher id carried by a filler entry when every teacher is busy.
pub const NO_SUPERVISOR_ID: &str = "UNSUPERVISED";

/// Counts produced by one [`fill_gaps`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GapFillSummary {
    /// Filler entries added.
    pub filled: usize,
    /// Of those, entries with [`NO_SUPERVISOR_ID`].
    pub unsupervised: usize,
    /// Gaps left open because no room was free.
    pub residual_gaps: usize,
}

/// `true` if `entry` was produced by the gap filler.
pub fn is_filler(entry: &ScheduleEntry) -> bool {
    entry.subject_id == FILLER_SUBJECT_ID
}

/// Fill every uncovered (batch, day, period) of `entries` in place.
pub fn fill_gaps(catalog: &Catalog, entries: &mut Vec<ScheduleEntry>) -> GapFillSummary {
    let cfg = &catalog.config;
    let day_index: HashMap<&str, usize> = cfg
        .days_per_week
        .iter()
        .enumerate()
        .map(|(i, d)| (d.as_str(), i))
        .collect();

    // (day, period, entity id) occupancy.
    let mut rooms_busy: HashSet<(usize, u32, String)> = HashSet::new();
    let mut teachers_busy: HashSet<(usize, u32, String)> = HashSet::new();
    let mut batches_busy: HashSet<(usize, u32, String)> = HashSet::new();

    for e in entries.iter() {
        let Some(&d) = day_index.get(e.day.as_str()) else {
            continue;
        };
        rooms_busy.insert((d, e.period, e.classroom_id.clone()));
        if e.teacher_id != NO_SUPERVISOR_ID {
            teachers_busy.insert((d, e.period, e.teacher_id.clone()));
        }
        for b in &e.batch_ids {
            batches_busy.insert((d, e.period, b.clone()));
        }
    }

    let mut summary = GapFillSummary::default();

    for batch in &catalog.batches {
        for (d, day) in cfg.days_per_week.iter().enumerate() {
            for period in 1..=cfg.slots_per_day {
                if batches_busy.contains(&(d, period, batch.id.clone())) {
                    continue;
                }

                let Some(room) = catalog
                    .classrooms
                    .iter()
                    .find(|r| !rooms_busy.contains(&(d, period, r.id.clone())))
                else {
                    debug!(batch = %batch.id, day = %day, period, "no free room – gap left open");
                    summary.residual_gaps += 1;
                    continue;
                };

                let teacher_id = match catalog
                    .teachers
                    .iter()
                    .find(|t| !teachers_busy.contains(&(d, period, t.id.clone())))
                {
                    Some(t) => {
                        teachers_busy.insert((d, period, t.id.clone()));
                        t.id.clone()
                    }
                    None => {
                        summary.unsupervised += 1;
                        NO_SUPERVISOR_ID.to_string()
                    }
                };

                rooms_busy.insert((d, period, room.id.clone()));
                batches_busy.insert((d, period, batch.id.clone()));

                entries.push(ScheduleEntry {
                    id: format!("filler_{}_{}_{}", batch.id, day, period),
                    subject_id: FILLER_SUBJECT_ID.to_string(),
                    teacher_id,
                    classroom_id: room.id.clone(),
                    batch_ids: vec![batch.id.clone()],
                    day: day.clone(),
                    period,
                });
                summary.filled += 1;
            }
        }
    }

    if summary.residual_gaps > 0 {
        warn!(
            residual_gaps = summary.residual_gaps,
            "gap filler ran out of rooms – some periods stay empty"
        );
    }
    info!(
        filled = summary.filled,
        unsupervised = summary.unsupervised,
        residual_gaps = summary.residual_gaps,
        "gap filling done"
    );
    summary
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Batch, Classroom, Teacher, WeekConfig};

    fn catalog(batches: &[&str], rooms: &[&str], teachers: &[&str], slots: u32) -> Catalog {
        Catalog {
            teachers: teachers
                .iter()
                .map(|id| Teacher {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            classrooms: rooms
                .iter()
                .map(|id| Classroom {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            batches: batches
                .iter()
                .map(|id| Batch {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            subjects: vec![],
            config: WeekConfig {
                days_per_week: vec!["Mon".into()],
                slots_per_day: slots,
                break_after: None,
            },
        }
    }

    fn lesson(batch: &str, room: &str, teacher: &str, period: u32) -> ScheduleEntry {
        ScheduleEntry {
            id: format!("sched_{batch}_{period}"),
            subject_id: "s1".into(),
            teacher_id: teacher.into(),
            classroom_id: room.into(),
            batch_ids: vec![batch.into()],
            day: "Mon".into(),
            period,
        }
    }

    #[test]
    fn fills_every_empty_period() {
        let cat = catalog(&["b1"], &["r1"], &["t1"], 3);
        let mut entries = vec![lesson("b1", "r1", "t1", 2)];
        let summary = fill_gaps(&cat, &mut entries);

        assert_eq!(summary.filled, 2);
        assert_eq!(summary.residual_gaps, 0);
        assert_eq!(entries.len(), 3);

        let filler = entries.iter().find(|e| e.period == 1).unwrap();
        assert!(is_filler(filler));
        assert_eq!(filler.id, "filler_b1_Mon_1");
        assert_eq!(filler.classroom_id, "r1");
        assert_eq!(filler.teacher_id, "t1");
    }

    #[test]
    fn occupied_rooms_and_teachers_are_skipped() {
        // b1 has a lesson in r1 with t1 at period 1; b2 is empty
        let cat = catalog(&["b1", "b2"], &["r1", "r2"], &["t1", "t2"], 1);
        let mut entries = vec![lesson("b1", "r1", "t1", 1)];
        fill_gaps(&cat, &mut entries);

        let filler = entries.iter().find(|e| e.has_batch("b2")).unwrap();
        assert_eq!(filler.classroom_id, "r2");
        assert_eq!(filler.teacher_id, "t2");
    }

    #[test]
    fn missing_teacher_yields_unsupervised_filler() {
        let cat = catalog(&["b1", "b2"], &["r1", "r2"], &["t1"], 1);
        let mut entries = vec![];
        let summary = fill_gaps(&cat, &mut entries);

        assert_eq!(summary.filled, 2);
        assert_eq!(summary.unsupervised, 1);
        assert_eq!(entries[0].teacher_id, "t1");
        assert_eq!(entries[1].teacher_id, NO_SUPERVISOR_ID);
    }

    #[test]
    fn gap_without_free_room_stays_open() {
        let cat = catalog(&["b1", "b2"], &["r1"], &["t1", "t2"], 2);
        let mut entries = vec![];
        let summary = fill_gaps(&cat, &mut entries);

        // b1 takes r1 in both periods; b2 finds nothing
        assert_eq!(summary.filled, 2);
        assert_eq!(summary.residual_gaps, 2);
        assert!(entries.iter().all(|e| e.has_batch("b1")));
    }

    #[test]
    fn second_pass_adds_nothing() {
        let cat = catalog(&["b1", "b2"], &["r1", "r2", "r3"], &["t1"], 4);
        let mut entries = vec![lesson("b2", "r3", "t1", 3)];
        let first = fill_gaps(&cat, &mut entries);
        assert_eq!(first.filled, 7);

        let snapshot = entries.clone();
        let second = fill_gaps(&cat, &mut entries);
        assert_eq!(second, GapFillSummary::default());
        assert_eq!(entries, snapshot);
    }
}
