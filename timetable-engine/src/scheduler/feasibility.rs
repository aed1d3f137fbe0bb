/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pre-solve capacity analysis.
//!
//! Cheap counting arguments that every feasible timetable must satisfy.
//! Each one only looks at requests that made it into the model:
//!
//! | Check | Necessary condition |
//! |---|---|
//! | batch | requests of the batch ≤ days × slots |
//! | teacher | requests of the teacher ≤ days × slots |
//! | weekly cap | requests of the teacher ≤ `maxLoadPerWeek` (only when load caps are enforced) |
//! | room pool | requests of a session type ≤ rooms usable by them × days × slots |
//!
//! A violation **proves** the model infeasible, so the engine reports
//! `INFEASIBLE` without running the search.  Passing all checks proves
//! nothing; the solver still decides.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Catalog, SessionType};
use crate::config::EngineSettings;
use crate::model::TimetableModel;

use super::requests::SessionRequest;

/// A counting argument that rules out every assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityViolation {
    BatchOverbooked {
        batch: String,
        requests: usize,
        slots: usize,
    },
    TeacherOverbooked {
        teacher: String,
        requests: usize,
        slots: usize,
    },
    WeeklyCapExceeded {
        teacher: String,
        requests: usize,
        cap: u32,
    },
    RoomPoolExhausted {
        session_type: SessionType,
        requests: usize,
        room_slots: usize,
    },
}

impl std::fmt::Display for CapacityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapacityViolation::BatchOverbooked {
                batch,
                requests,
                slots,
            } => write!(
                f,
                "batch '{}' needs {} sessions but the week has {} slots",
                batch, requests, slots
            ),
            CapacityViolation::TeacherOverbooked {
                teacher,
                requests,
                slots,
            } => write!(
                f,
                "teacher '{}' is bound to {} sessions but the week has {} slots",
                teacher, requests, slots
            ),
            CapacityViolation::WeeklyCapExceeded {
                teacher,
                requests,
                cap,
            } => write!(
                f,
                "teacher '{}' is bound to {} sessions, above the weekly cap of {}",
                teacher, requests, cap
            ),
            CapacityViolation::RoomPoolExhausted {
                session_type,
                requests,
                room_slots,
            } => write!(
                f,
                "{} {} sessions compete for {} room-slots",
                requests, session_type, room_slots
            ),
        }
    }
}

/// Run every check and return all violations (empty = nothing ruled out).
pub fn check_capacity(
    catalog: &Catalog,
    requests: &[SessionRequest],
    model: &TimetableModel,
    settings: &EngineSettings,
) -> Vec<CapacityViolation> {
    let slots = catalog.config.slot_count();

    let mut per_batch: BTreeMap<usize, usize> = BTreeMap::new();
    let mut per_teacher: BTreeMap<usize, usize> = BTreeMap::new();
    let mut per_type: BTreeMap<SessionType, (usize, BTreeSet<usize>)> = BTreeMap::new();

    for req in requests.iter().filter(|r| model.is_placeable(r.id)) {
        *per_batch.entry(req.batch).or_default() += 1;
        *per_teacher.entry(req.teacher).or_default() += 1;
        let pool = per_type.entry(req.session_type).or_default();
        pool.0 += 1;
        pool.1.extend(model.request_rooms[req.id].iter().copied());
    }

    let mut violations = Vec::new();

    for (&b, &n) in &per_batch {
        if n > slots {
            violations.push(CapacityViolation::BatchOverbooked {
                batch: catalog.batches[b].id.clone(),
                requests: n,
                slots,
            });
        }
    }

    for (&t, &n) in &per_teacher {
        let teacher = &catalog.teachers[t];
        if n > slots {
            violations.push(CapacityViolation::TeacherOverbooked {
                teacher: teacher.id.clone(),
                requests: n,
                slots,
            });
        }
        let cap = teacher.max_load_per_week;
        if settings.enforce_teacher_load && cap > 0 && n > cap as usize {
            violations.push(CapacityViolation::WeeklyCapExceeded {
                teacher: teacher.id.clone(),
                requests: n,
                cap,
            });
        }
    }

    for (&session_type, (n, rooms)) in &per_type {
        let room_slots = rooms.len() * slots;
        if *n > room_slots {
            violations.push(CapacityViolation::RoomPoolExhausted {
                session_type,
                requests: *n,
                room_slots,
            });
        }
    }

    violations
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Batch, Classroom, Subject, Teacher, WeekConfig};
    use crate::model::ModelBuilder;
    use crate::scheduler::requests::{generate_requests, TeacherLoad};

    fn run(cat: &Catalog, settings: &EngineSettings) -> Vec<CapacityViolation> {
        let reqs = generate_requests(cat, &mut TeacherLoad::new()).requests;
        let model = ModelBuilder::new(cat, &reqs, settings).build();
        check_capacity(cat, &reqs, &model, settings)
    }

    /// `batches` batches, one shared teacher, one Theory subject of
    /// `credits`, `rooms` Theory rooms, 1 day × `slots` periods.
    fn catalog(batches: usize, credits: u32, rooms: usize, slots: u32) -> Catalog {
        Catalog {
            teachers: vec![Teacher {
                id: "t1".into(),
                qualified_subjects: vec!["s1".into()],
                max_load_per_week: 3,
                ..Default::default()
            }],
            classrooms: (0..rooms)
                .map(|i| Classroom {
                    id: format!("r{i}"),
                    capacity: 50,
                    ..Default::default()
                })
                .collect(),
            subjects: vec![Subject {
                id: "s1".into(),
                credits,
                ..Default::default()
            }],
            batches: (0..batches)
                .map(|i| Batch {
                    id: format!("b{i}"),
                    size: 40,
                    ..Default::default()
                })
                .collect(),
            config: WeekConfig {
                days_per_week: vec!["Mon".into()],
                slots_per_day: slots,
                break_after: None,
            },
        }
    }

    #[test]
    fn comfortable_instance_passes() {
        let v = run(&catalog(1, 2, 1, 4), &EngineSettings::default());
        assert!(v.is_empty(), "unexpected violations: {v:?}");
    }

    #[test]
    fn overbooked_batch_is_detected() {
        let v = run(&catalog(1, 5, 2, 4), &EngineSettings::default());
        assert!(v
            .iter()
            .any(|x| matches!(x, CapacityViolation::BatchOverbooked { requests: 5, slots: 4, .. })));
    }

    #[test]
    fn overbooked_teacher_and_room_pool_are_detected() {
        // two batches × 3 sessions with one teacher and one room in 4 slots
        let v = run(&catalog(2, 3, 1, 4), &EngineSettings::default());
        assert!(v
            .iter()
            .any(|x| matches!(x, CapacityViolation::TeacherOverbooked { requests: 6, .. })));
        assert!(v.iter().any(|x| matches!(
            x,
            CapacityViolation::RoomPoolExhausted {
                requests: 6,
                room_slots: 4,
                ..
            }
        )));
    }

    #[test]
    fn weekly_cap_only_checked_when_enforced() {
        let cat = catalog(1, 4, 1, 6);
        assert!(run(&cat, &EngineSettings::default()).is_empty());

        let settings = EngineSettings {
            enforce_teacher_load: true,
            ..Default::default()
        };
        let v = run(&cat, &settings);
        assert_eq!(
            v,
            vec![CapacityViolation::WeeklyCapExceeded {
                teacher: "t1".into(),
                requests: 4,
                cap: 3
            }]
        );
    }

    #[test]
    fn unplaceable_requests_are_ignored() {
        // no rooms at all → nothing placeable → nothing to count
        let v = run(&catalog(1, 9, 0, 4), &EngineSettings::default());
        assert!(v.is_empty());
    }
}
