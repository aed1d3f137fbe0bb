/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetable engine – weekly session placement for batches, teachers and rooms
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── catalog/        – input data model (subjects, teachers, batches, rooms, week)
//! ├── config/         – YAML engine settings
//! ├── scheduler/      – pipeline: requests, capacity check, gap filler, report
//! ├── model/          – constraint model builder + break-aware windows
//! ├── solver/         – narrow solver interface + backtracking backend
//! └── schedule/       – output entries and the solution extractor
//! ```

pub mod catalog;
pub mod config;
pub mod model;
pub mod schedule;
pub mod scheduler;
pub mod solver;
