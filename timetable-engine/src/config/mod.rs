/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Engine settings loading.
//!
//! The catalog says *what* to schedule; these settings say *how hard* the
//! engine tries and which optional constraints it switches on.
//!
//! The expected YAML structure is:
//! ```yaml
//! solver:
//!   time_limit_secs: 30
//! constraints:
//!   consecutive_limit: 3
//!   consecutive_scope: both
//!   enforce_teacher_load: false
//!   honor_unavailable_slots: false
//!   room_filter: strict
//! gap_filler:
//!   enabled: true
//! ```
//!
//! Every section and field is optional.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Reference wall-clock budget for one solve.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 30;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default)]
    solver: SolverSection,
    #[serde(default)]
    constraints: ConstraintSection,
    #[serde(default)]
    gap_filler: GapFillerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SolverSection {
    time_limit_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstraintSection {
    consecutive_limit: Option<u32>,
    #[serde(default)]
    consecutive_scope: ConsecutiveScope,
    #[serde(default)]
    enforce_teacher_load: bool,
    #[serde(default)]
    honor_unavailable_slots: bool,
    #[serde(default)]
    room_filter: RoomFilter,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GapFillerSection {
    #[serde(default = "default_true")]
    enabled: bool,
}

impl Default for GapFillerSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

// ── Public data structures ────────────────────────────────────────────────────

/// How strictly rooms are matched against session requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomFilter {
    /// Room type must match and capacity must cover the batch.
    #[default]
    Strict,
    /// Room type must match; capacity is ignored.
    TypeOnly,
    /// Any room hosts any session.
    Any,
}

/// Which entities the consecutive-session cap applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsecutiveScope {
    Batches,
    Teachers,
    #[default]
    Both,
}

impl ConsecutiveScope {
    pub fn covers_batches(self) -> bool {
        matches!(self, ConsecutiveScope::Batches | ConsecutiveScope::Both)
    }

    pub fn covers_teachers(self) -> bool {
        matches!(self, ConsecutiveScope::Teachers | ConsecutiveScope::Both)
    }
}

/// Fully resolved engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Wall-clock budget enforced by the solver itself.
    pub time_limit: Duration,

    /// Maximum consecutive sessions per entity per day.  `None` = disabled.
    pub consecutive_limit: Option<u32>,

    pub consecutive_scope: ConsecutiveScope,

    /// Add per-teacher daily / weekly load caps to the model.
    pub enforce_teacher_load: bool,

    /// Withhold variables for slots a teacher declared unavailable.
    pub honor_unavailable_slots: bool,

    pub room_filter: RoomFilter,

    pub gap_filler_enabled: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(DEFAULT_TIME_LIMIT_SECS),
            consecutive_limit: None,
            consecutive_scope: ConsecutiveScope::default(),
            enforce_teacher_load: false,
            honor_unavailable_slots: false,
            room_filter: RoomFilter::default(),
            gap_filler_enabled: true,
        }
    }
}

impl EngineSettings {
    /// Parses `path` into a settings value.  Missing fields keep their
    /// defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, if the YAML is
    /// structurally invalid or names an unknown field, or if
    /// `consecutive_limit` / `time_limit_secs` is zero.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading engine settings from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open settings file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Parses settings from an in-memory YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document deserialises to `null`, not to an empty mapping.
        let file: SettingsFile = if content.trim().is_empty() {
            SettingsFile::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML")?
        };

        let time_limit_secs = file
            .solver
            .time_limit_secs
            .unwrap_or(DEFAULT_TIME_LIMIT_SECS);
        if time_limit_secs == 0 {
            anyhow::bail!("solver.time_limit_secs must be positive");
        }
        if file.constraints.consecutive_limit == Some(0) {
            anyhow::bail!("constraints.consecutive_limit must be positive when set");
        }

        let settings = Self {
            time_limit: Duration::from_secs(time_limit_secs),
            consecutive_limit: file.constraints.consecutive_limit,
            consecutive_scope: file.constraints.consecutive_scope,
            enforce_teacher_load: file.constraints.enforce_teacher_load,
            honor_unavailable_slots: file.constraints.honor_unavailable_slots,
            room_filter: file.constraints.room_filter,
            gap_filler_enabled: file.gap_filler.enabled,
        };

        debug!(?settings, "engine settings resolved");
        Ok(settings)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn defaults_match_reference_behaviour() {
        let s = EngineSettings::default();
        assert_eq!(s.time_limit, Duration::from_secs(30));
        assert_eq!(s.consecutive_limit, None);
        assert_eq!(s.room_filter, RoomFilter::Strict);
        assert!(!s.enforce_teacher_load);
        assert!(!s.honor_unavailable_slots);
        assert!(s.gap_filler_enabled);
    }

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
solver:
  time_limit_secs: 5
constraints:
  consecutive_limit: 2
  consecutive_scope: teachers
  enforce_teacher_load: true
  honor_unavailable_slots: true
  room_filter: type_only
gap_filler:
  enabled: false
"#;
        let f = yaml_tempfile(yaml);
        let s = EngineSettings::load_from_file(f.path()).unwrap();

        assert_eq!(s.time_limit, Duration::from_secs(5));
        assert_eq!(s.consecutive_limit, Some(2));
        assert_eq!(s.consecutive_scope, ConsecutiveScope::Teachers);
        assert!(!s.consecutive_scope.covers_batches());
        assert!(s.consecutive_scope.covers_teachers());
        assert!(s.enforce_teacher_load);
        assert!(s.honor_unavailable_slots);
        assert_eq!(s.room_filter, RoomFilter::TypeOnly);
        assert!(!s.gap_filler_enabled);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let f = yaml_tempfile("constraints:\n  consecutive_limit: 3\n");
        let s = EngineSettings::load_from_file(f.path()).unwrap();
        assert_eq!(s.consecutive_limit, Some(3));
        assert_eq!(s.consecutive_scope, ConsecutiveScope::Both);
        assert_eq!(s.time_limit, Duration::from_secs(DEFAULT_TIME_LIMIT_SECS));
        assert!(s.gap_filler_enabled);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let f = yaml_tempfile("");
        let s = EngineSettings::load_from_file(f.path()).unwrap();
        assert_eq!(s, EngineSettings::default());
    }

    #[test]
    fn missing_file_returns_error() {
        let result = EngineSettings::load_from_file(Path::new("/nonexistent/settings.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_field_returns_error() {
        let f = yaml_tempfile("solver:\n  time_limit: 5\n");
        assert!(EngineSettings::load_from_file(f.path()).is_err());
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(EngineSettings::from_yaml_str("solver:\n  time_limit_secs: 0\n").is_err());
        assert!(EngineSettings::from_yaml_str("constraints:\n  consecutive_limit: 0\n").is_err());
    }
}
