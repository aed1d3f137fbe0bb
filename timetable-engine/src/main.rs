/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};

use timetable_engine::catalog::Catalog;
use timetable_engine::config::EngineSettings;
use timetable_engine::scheduler::{SolveReport, TimetableEngine};
use timetable_engine::solver::CancelFlag;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Timetable engine: reads a catalog as JSON, writes the schedule as JSON.
///
/// Example:
///   timetable-engine --config engine.yaml < catalog.json > schedule.json
#[derive(Debug, Parser)]
#[command(
    name = "timetable-engine",
    about = "Weekly timetable engine – JSON catalog in, JSON schedule out",
    long_about = None,
)]
struct Cli {
    /// Read the catalog from this file instead of standard input.
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Path to the YAML engine settings file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Solver time budget in seconds (overrides the settings file).
    #[arg(short = 't', long = "time-limit")]
    time_limit: Option<u64>,

    /// Write the solve report as JSON to this file.
    #[arg(short = 'r', long = "report")]
    report: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries only the schedule.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        input = ?cli.input,
        config = ?cli.config,
        time_limit = ?cli.time_limit,
        report = ?cli.report,
        "Configuration"
    );

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // ── Read the catalog ──────────────────────────────────────────────────────
    let raw = match &cli.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read catalog: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Cannot read catalog from stdin")?;
            buf
        }
    };

    // ── Load engine settings ──────────────────────────────────────────────────
    let mut settings = match &cli.config {
        Some(path) => EngineSettings::load_from_file(path)?,
        None => {
            info!("No settings file provided, using default engine settings");
            EngineSettings::default()
        }
    };
    if let Some(secs) = cli.time_limit {
        anyhow::ensure!(secs > 0, "--time-limit must be positive");
        settings.time_limit = Duration::from_secs(secs);
    }

    // ── Solve off the async runtime, cancellable with Ctrl-C ──────────────────
    let cancel = CancelFlag::new();
    let worker_cancel = cancel.clone();
    let mut solve =
        tokio::task::spawn_blocking(move || solve_document(&raw, settings, worker_cancel));

    let joined = tokio::select! {
        res = &mut solve => res,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupt received, cancelling the search");
            cancel.cancel();
            solve.await
        }
    };
    let output = joined.context("Solver task panicked")??;

    // ── Report ────────────────────────────────────────────────────────────────
    if let (Some(report), Some(path)) = (&output.report, &cli.report) {
        let json = serde_json::to_string_pretty(report).context("Cannot serialise report")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Cannot write report: {}", path.display()))?;
    }

    // ── Emit the schedule ─────────────────────────────────────────────────────
    println!("{}", output.schedule_json);
    Ok(())
}

// ── Document handling ─────────────────────────────────────────────────────────

/// What one catalog document produces.
#[derive(Debug)]
struct DocumentOutput {
    /// The JSON array for standard output.
    schedule_json: String,
    /// `None` when the input was empty and nothing was solved.
    report: Option<SolveReport>,
}

/// Parse `raw`, solve it and serialise the schedule.
///
/// Empty or whitespace-only input yields `[]`.  Any error leaves nothing to
/// print on standard output.
fn solve_document(
    raw: &str,
    settings: EngineSettings,
    cancel: CancelFlag,
) -> Result<DocumentOutput> {
    if raw.trim().is_empty() {
        warn!("empty input, nothing to schedule");
        return Ok(DocumentOutput {
            schedule_json: "[]".to_string(),
            report: None,
        });
    }

    let catalog = Catalog::from_json(raw).context("Failed to parse catalog JSON")?;
    let timetable = TimetableEngine::new(settings)
        .solve_with_cancel(&catalog, cancel)
        .context("Timetable solve failed")?;

    let report = &timetable.report;
    info!(
        status = ?report.status,
        requests = report.requests_generated,
        scheduled = report.scheduled_sessions,
        fillers = report.filler_entries,
        unsupervised = report.unsupervised_fillers,
        residual_gaps = report.residual_gaps,
        dropped = report.drops.len(),
        "Solve report"
    );

    let schedule_json =
        serde_json::to_string(&timetable.entries).context("Cannot serialise schedule")?;
    Ok(DocumentOutput {
        schedule_json,
        report: Some(timetable.report),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use timetable_engine::schedule::ScheduleEntry;
    use timetable_engine::solver::SolveStatus;

    fn run_doc(raw: &str) -> Result<DocumentOutput> {
        solve_document(raw, EngineSettings::default(), CancelFlag::new())
    }

    #[test]
    fn empty_input_prints_an_empty_array() {
        let out = run_doc("").unwrap();
        assert_eq!(out.schedule_json, "[]");
        assert!(out.report.is_none());
    }

    #[test]
    fn whitespace_input_prints_an_empty_array() {
        let out = run_doc("  \n\t \r\n").unwrap();
        assert_eq!(out.schedule_json, "[]");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = run_doc(r#"{"batches": ["#).unwrap_err();
        assert!(
            format!("{:#}", err).contains("Failed to parse catalog JSON"),
            "{err:#}"
        );
    }

    #[test]
    fn invalid_week_is_an_error() {
        let err = run_doc(r#"{"config": {"daysPerWeek": [], "slotsPerDay": 3}}"#).unwrap_err();
        assert!(format!("{:#}", err).contains("Timetable solve failed"));
    }

    #[test]
    fn valid_catalog_prints_only_the_schedule_array() {
        let raw = r#"{
            "teachers":   [{ "id": "t1", "qualifiedSubjects": ["s1"] }],
            "classrooms": [{ "id": "r1", "capacity": 40, "type": "Theory" }],
            "subjects":   [{ "id": "s1", "credits": 2 }],
            "batches":    [{ "id": "b1", "size": 30 }],
            "config":     { "daysPerWeek": ["Mon", "Tue"], "slotsPerDay": 3 }
        }"#;
        let out = run_doc(raw).unwrap();

        let entries: Vec<ScheduleEntry> = serde_json::from_str(&out.schedule_json).unwrap();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries.iter().filter(|e| e.subject_id == "s1").count(), 2);

        let report = out.report.unwrap();
        assert_eq!(report.status, Some(SolveStatus::Feasible));
        assert_eq!(report.filler_entries, 4);
    }
}
