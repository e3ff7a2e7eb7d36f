//! Snapshot and report → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): indented summary lines
//! - **JSON** (`--json`): `serde_json::to_string_pretty`

use std::fmt::Write;
use std::path::Path;

use apiary_core::{Error, Hive, Role, Snapshot, Task};
use apiary_durability::{LoadReport, LoadSource};
use serde_json::json;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

fn source_label(source: LoadSource) -> &'static str {
    match source {
        LoadSource::Disk => "disk",
        LoadSource::Bootstrap => "bootstrap",
    }
}

fn issue_line(issue: &Error) -> String {
    match issue {
        Error::Parse { line, reason } => format!("line {}: {}", line, reason),
        other => other.to_string(),
    }
}

fn issues_json(report: &LoadReport) -> Vec<serde_json::Value> {
    report
        .issues
        .iter()
        .map(|issue| match issue {
            Error::Parse { line, reason } => json!({ "line": line, "reason": reason }),
            other => json!({ "reason": other.to_string() }),
        })
        .collect()
}

fn pretty(value: serde_json::Value) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// Format an error.
pub fn format_error(err: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(json!({ "error": err })),
        OutputMode::Human => format!("(error) {}", err),
    }
}

/// Format the output of `show`.
pub fn format_show(path: &Path, snapshot: &Snapshot, report: &LoadReport, mode: OutputMode) -> String {
    let stats = snapshot.task_statistics();
    match mode {
        OutputMode::Json => pretty(json!({
            "path": path.display().to_string(),
            "source": source_label(report.source),
            "snapshot": snapshot,
            "task_statistics": stats,
            "issues": issues_json(report),
        })),
        OutputMode::Human => {
            let mut out = String::new();
            // Writing to a String cannot fail
            let _ = writeln!(out, "Data file: {} ({})", path.display(), source_label(report.source));

            let admins = snapshot.accounts_by_role(Role::Admin).len();
            let _ = writeln!(out, "Accounts: {} ({} admin)", snapshot.accounts.len(), admins);
            for account in &snapshot.accounts {
                let _ = writeln!(
                    out,
                    "  {} ({}) [{}]",
                    account.username, account.display_name, account.role
                );
            }

            let _ = writeln!(out, "Locations: {}", snapshot.locations.len());
            for location in snapshot.locations.iter() {
                let _ = writeln!(out, "  {}", location);
            }

            let _ = writeln!(
                out,
                "Hives: {} ({} need attention)",
                snapshot.hives.len(),
                snapshot.hives_needing_attention().len()
            );
            for hive in &snapshot.hives {
                write_hive(&mut out, hive);
            }

            let _ = writeln!(
                out,
                "Tasks: {} (pending {}, completed {}, overdue {})",
                stats.total, stats.pending, stats.completed, stats.overdue
            );
            for task in &snapshot.tasks {
                write_task(&mut out, task);
            }

            if !report.is_clean() {
                let _ = writeln!(out, "Skipped lines: {}", report.issues.len());
                for issue in &report.issues {
                    let _ = writeln!(out, "  {}", issue_line(issue));
                }
            }
            out.trim_end().to_string()
        }
    }
}

fn write_hive(out: &mut String, hive: &Hive) {
    let _ = writeln!(
        out,
        "  #{} tag {} {} @ {} status={} honey={} queen={}",
        hive.id(),
        hive.tag_number(),
        hive.tag_color(),
        hive.location(),
        hive.status(),
        hive.honey_level(),
        if hive.has_queen() { "yes" } else { "no" }
    );
    if !hive.required_actions().is_empty() {
        let actions: Vec<&str> = hive.required_actions().iter().collect();
        let _ = writeln!(out, "     actions: {}", actions.join("; "));
    }
    if !hive.notes().is_empty() {
        let _ = writeln!(out, "     notes: {}", hive.notes());
    }
}

fn write_task(out: &mut String, task: &Task) {
    let _ = writeln!(
        out,
        "  #{} [{}] {} @ {}",
        task.id(),
        task.status(),
        task.name(),
        task.location()
    );
    let _ = writeln!(out, "     {}", task.description());
    if !task.notes().is_empty() {
        let _ = writeln!(out, "     notes: {}", task.notes());
    }
}

/// Format the output of `verify`.
pub fn format_verify(path: &Path, report: &LoadReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(json!({
            "path": path.display().to_string(),
            "source": source_label(report.source),
            "ok": report.source == LoadSource::Disk && report.is_clean(),
            "issues": issues_json(report),
        })),
        OutputMode::Human => match report.source {
            LoadSource::Bootstrap => format!("{}: no readable data file", path.display()),
            LoadSource::Disk if report.is_clean() => format!("{}: ok", path.display()),
            LoadSource::Disk => {
                let mut out = format!(
                    "{}: {} skipped line(s)",
                    path.display(),
                    report.issues.len()
                );
                for issue in &report.issues {
                    let _ = write!(out, "\n  {}", issue_line(issue));
                }
                out
            }
        },
    }
}
