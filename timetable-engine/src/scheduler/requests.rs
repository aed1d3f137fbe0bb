/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Session request generation.
//!
//! Expands the catalog into one [`SessionRequest`] per required
//! (batch, subject, credit) unit and binds each to a teacher up front, so the
//! model only decides *when and where*, never *who*.
//!
//! Teacher choice is a greedy load balance: among the candidate set, the
//! teacher with the lowest accumulated credit load wins, ties broken by
//! teacher id.  The tally is an explicit [`TeacherLoad`] owned by the caller.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::catalog::{Catalog, SessionType};

use super::error::DropReason;

// ── Types ─────────────────────────────────────────────────────────────────────

/// One period of `subject` that `batch` must attend, taught by `teacher`.
///
/// `batch`, `subject` and `teacher` are indices into the catalog lists the
/// request was generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    /// Position in the generated list; stable for one solve.
    pub id: usize,
    pub batch: usize,
    pub subject: usize,
    pub teacher: usize,
    pub session_type: SessionType,
}

/// Credits assigned so far, per teacher id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherLoad(BTreeMap<String, u32>);

impl TeacherLoad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, teacher_id: &str) -> u32 {
        self.0.get(teacher_id).copied().unwrap_or(0)
    }

    pub fn add(&mut self, teacher_id: &str, credits: u32) {
        *self.0.entry(teacher_id.to_string()).or_insert(0) += credits;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Output of [`generate_requests`].
#[derive(Debug, Clone, Default)]
pub struct GeneratedRequests {
    pub requests: Vec<SessionRequest>,
    /// (batch, subject) pairs that could not be bound to any teacher.
    pub dropped: Vec<DropReason>,
}

// ── Generation ────────────────────────────────────────────────────────────────

/// Expand `catalog` into session requests, batch-major then subject order.
///
/// `load` is updated with every assignment; pass a fresh tally for an
/// independent solve.
pub fn generate_requests(catalog: &Catalog, load: &mut TeacherLoad) -> GeneratedRequests {
    let mut out = GeneratedRequests::default();

    for (b_idx, batch) in catalog.batches.iter().enumerate() {
        for (s_idx, subject) in catalog.subjects.iter().enumerate() {
            if !batch.takes_subject(&subject.id) || !subject.admits_batch(&batch.id) {
                continue;
            }

            let Some(t_idx) = pick_teacher(catalog, b_idx, s_idx, load) else {
                let reason = DropReason::NoTeachers {
                    batch: batch.id.clone(),
                    subject: subject.id.clone(),
                };
                warn!("{}", reason);
                out.dropped.push(reason);
                continue;
            };

            let teacher = &catalog.teachers[t_idx];
            load.add(&teacher.id, subject.credits);
            debug!(
                batch   = %batch.id,
                subject = %subject.id,
                teacher = %teacher.id,
                credits = subject.credits,
                load    = load.get(&teacher.id),
                "teacher assigned"
            );

            for _ in 0..subject.credits {
                out.requests.push(SessionRequest {
                    id: out.requests.len(),
                    batch: b_idx,
                    subject: s_idx,
                    teacher: t_idx,
                    session_type: subject.session_type,
                });
            }
        }
    }

    info!(
        requests = out.requests.len(),
        dropped_pairs = out.dropped.len(),
        "session requests generated"
    );
    out
}

/// Candidate set, in priority order: qualified teachers, else teachers of the
/// batch's department, else the first teacher in the catalog.  The least
/// loaded candidate wins.
fn pick_teacher(
    catalog: &Catalog,
    b_idx: usize,
    s_idx: usize,
    load: &TeacherLoad,
) -> Option<usize> {
    let teachers = &catalog.teachers;
    if teachers.is_empty() {
        return None;
    }
    let subject = &catalog.subjects[s_idx];
    let batch = &catalog.batches[b_idx];

    let mut candidates: Vec<usize> = (0..teachers.len())
        .filter(|&t| teachers[t].is_qualified_for(&subject.id))
        .collect();
    if candidates.is_empty() {
        candidates = (0..teachers.len())
            .filter(|&t| teachers[t].department == batch.department)
            .collect();
        if !candidates.is_empty() {
            debug!(
                subject = %subject.id,
                batch = %batch.id,
                "no qualified teacher, using department fallback"
            );
        }
    }
    if candidates.is_empty() {
        debug!(
            subject = %subject.id,
            batch = %batch.id,
            "no department teacher, using first teacher"
        );
        candidates.push(0);
    }

    candidates.into_iter().min_by(|&a, &b| {
        load.get(&teachers[a].id)
            .cmp(&load.get(&teachers[b].id))
            .then_with(|| teachers[a].id.cmp(&teachers[b].id))
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Batch, Subject, Teacher};

    fn teacher(id: &str, dept: &str, qualified: &[&str]) -> Teacher {
        Teacher {
            id: id.to_string(),
            department: dept.to_string(),
            qualified_subjects: qualified.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn subject(id: &str, credits: u32) -> Subject {
        Subject {
            id: id.to_string(),
            credits,
            ..Default::default()
        }
    }

    fn batch(id: &str, dept: &str) -> Batch {
        Batch {
            id: id.to_string(),
            department: dept.to_string(),
            size: 30,
            ..Default::default()
        }
    }

    fn count_pair(reqs: &GeneratedRequests, b: usize, s: usize) -> usize {
        reqs.requests
            .iter()
            .filter(|r| r.batch == b && r.subject == s)
            .count()
    }

    #[test]
    fn request_count_equals_credits() {
        let cat = Catalog {
            teachers: vec![teacher("t1", "CS", &["s1", "s2"])],
            subjects: vec![subject("s1", 3), subject("s2", 1)],
            batches: vec![batch("b1", "CS"), batch("b2", "CS")],
            ..Default::default()
        };
        let out = generate_requests(&cat, &mut TeacherLoad::new());

        assert_eq!(out.requests.len(), 8);
        for b in 0..2 {
            assert_eq!(count_pair(&out, b, 0), 3);
            assert_eq!(count_pair(&out, b, 1), 1);
        }
        // ids are positional
        assert!(out.requests.iter().enumerate().all(|(i, r)| r.id == i));
        // batch-major order
        assert!(out.requests[..4].iter().all(|r| r.batch == 0));
    }

    #[test]
    fn both_restriction_lists_are_applied() {
        let mut s_restricted = subject("s1", 2);
        s_restricted.required_batches = Some(vec!["b2".into()]);
        let mut b_restricted = batch("b1", "CS");
        b_restricted.required_subjects = Some(vec!["s2".into()]);

        let cat = Catalog {
            teachers: vec![teacher("t1", "CS", &[])],
            subjects: vec![s_restricted, subject("s2", 1)],
            batches: vec![b_restricted, batch("b2", "CS")],
            ..Default::default()
        };
        let out = generate_requests(&cat, &mut TeacherLoad::new());

        assert_eq!(count_pair(&out, 0, 0), 0, "b1 does not list s1");
        assert_eq!(count_pair(&out, 0, 1), 1);
        assert_eq!(count_pair(&out, 1, 0), 2, "s1 lists b2");
        assert_eq!(count_pair(&out, 1, 1), 1);
    }

    #[test]
    fn least_loaded_qualified_teacher_wins() {
        let cat = Catalog {
            teachers: vec![teacher("t2", "CS", &["s1"]), teacher("t1", "CS", &["s1"])],
            subjects: vec![subject("s1", 2)],
            batches: vec![batch("b1", "CS"), batch("b2", "CS"), batch("b3", "CS")],
            ..Default::default()
        };
        let mut load = TeacherLoad::new();
        let out = generate_requests(&cat, &mut load);

        // tie at 0 → "t1" (index 1) by id; then t2 is lighter; then tie again → t1
        let teachers: Vec<usize> = out.requests.iter().step_by(2).map(|r| r.teacher).collect();
        assert_eq!(teachers, vec![1, 0, 1]);
        assert_eq!(load.get("t1"), 4);
        assert_eq!(load.get("t2"), 2);
    }

    #[test]
    fn falls_back_to_department_then_first_teacher() {
        let cat = Catalog {
            teachers: vec![
                teacher("t_math", "MATH", &["other"]),
                teacher("t_cs", "CS", &["other"]),
            ],
            subjects: vec![subject("s1", 1)],
            batches: vec![batch("b_cs", "CS"), batch("b_bio", "BIO")],
            ..Default::default()
        };
        let out = generate_requests(&cat, &mut TeacherLoad::new());

        assert_eq!(out.requests[0].teacher, 1, "CS batch → CS teacher");
        assert_eq!(out.requests[1].teacher, 0, "no BIO teacher → first teacher");
    }

    #[test]
    fn no_teachers_drops_pair_without_failing() {
        let cat = Catalog {
            subjects: vec![subject("s1", 2)],
            batches: vec![batch("b1", "CS")],
            ..Default::default()
        };
        let out = generate_requests(&cat, &mut TeacherLoad::new());
        assert!(out.requests.is_empty());
        assert_eq!(
            out.dropped,
            vec![DropReason::NoTeachers {
                batch: "b1".into(),
                subject: "s1".into()
            }]
        );
    }

    #[test]
    fn zero_credit_subject_emits_nothing() {
        let cat = Catalog {
            teachers: vec![teacher("t1", "CS", &["s1"])],
            subjects: vec![subject("s1", 0)],
            batches: vec![batch("b1", "CS")],
            ..Default::default()
        };
        let out = generate_requests(&cat, &mut TeacherLoad::new());
        assert!(out.requests.is_empty());
        assert!(out.dropped.is_empty());
    }
}
