// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald status` and the status screen of the menu.
//!
//! Inside the menu the report covers the live process (uptime, active
//! accounts, work cycle). From the command line only the stored state is
//! known, so those fields are left empty.

use std::io::IsTerminal;

use serde::Serialize;

use herald_config::HeraldConfig;
use herald_core::{AccountStore, HeraldError};
use herald_rules::RuleStore;
use herald_storage::SqliteAccountStore;

/// Structured status output, also printed as JSON with `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Whether the report comes from the process running the responder.
    pub running: bool,
    pub uptime_secs: Option<u64>,
    pub total_accounts: i64,
    pub active_accounts: usize,
    pub rules: usize,
    pub pending_tasks: Option<usize>,
    pub work_cycle_running: Option<bool>,
    pub work_cycle_iteration: Option<u64>,
}

/// Format seconds into a human-readable duration string.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Run the `herald status` command.
pub async fn run_status(config: &HeraldConfig, json: bool, plain: bool) -> Result<(), HeraldError> {
    let store = SqliteAccountStore::open(&config.storage).await?;
    let rules = RuleStore::open(&config.rules.rules_file, config.rules.default_response.clone());

    let report = StatusReport {
        running: false,
        uptime_secs: None,
        total_accounts: store.count_accounts().await?,
        active_accounts: 0,
        rules: rules.len(),
        pending_tasks: None,
        work_cycle_running: None,
        work_cycle_iteration: None,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print!("{}", render_status(&report, use_color));
    }
    Ok(())
}

/// Renders the status block printed by the menu and `herald status`.
pub fn render_status(report: &StatusReport, use_color: bool) -> String {
    use colored::Colorize;
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  herald status");
    let _ = writeln!(out, "  {}", "-".repeat(35));

    let state = match (report.uptime_secs, use_color) {
        (Some(secs), true) => format!(
            "{} {} (uptime: {})",
            "✓".green(),
            "running".green(),
            format_uptime(secs)
        ),
        (Some(secs), false) => format!("[OK] running (uptime: {})", format_uptime(secs)),
        (None, true) => format!("{} {}", "-".dimmed(), "responder not running here".dimmed()),
        (None, false) => "[--] responder not running here".to_string(),
    };
    let _ = writeln!(out, "    State:            {state}");
    let _ = writeln!(out, "    Total accounts:   {}", report.total_accounts);
    let _ = writeln!(out, "    Active accounts:  {}", report.active_accounts);
    let _ = writeln!(out, "    Rules:            {}", report.rules);
    if let Some(pending) = report.pending_tasks {
        let _ = writeln!(out, "    Pending tasks:    {pending}");
    }
    if let (Some(running), Some(iteration)) =
        (report.work_cycle_running, report.work_cycle_iteration)
    {
        let label = if running { "running" } else { "stopped" };
        let _ = writeln!(out, "    Work cycle:       {label} (iteration {iteration})");
    }
    let _ = writeln!(out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> StatusReport {
        StatusReport {
            running: true,
            uptime_secs: Some(3720),
            total_accounts: 4,
            active_accounts: 2,
            rules: 3,
            pending_tasks: Some(1),
            work_cycle_running: Some(true),
            work_cycle_iteration: Some(7),
        }
    }

    #[test]
    fn format_uptime_seconds() {
        assert_eq!(format_uptime(42), "42s");
    }

    #[test]
    fn format_uptime_minutes() {
        assert_eq!(format_uptime(125), "2m 5s");
    }

    #[test]
    fn format_uptime_hours() {
        assert_eq!(format_uptime(3720), "1h 2m");
    }

    #[test]
    fn format_uptime_days() {
        assert_eq!(format_uptime(90060), "1d 1h 1m");
    }

    #[test]
    fn plain_render_lists_counts() {
        let text = render_status(&report(), false);
        assert!(text.contains("[OK] running (uptime: 1h 2m)"));
        assert!(text.contains("Total accounts:   4"));
        assert!(text.contains("Active accounts:  2"));
        assert!(text.contains("Pending tasks:    1"));
        assert!(text.contains("Work cycle:       running (iteration 7)"));
    }

    #[test]
    fn offline_render_omits_process_fields() {
        let mut offline = report();
        offline.running = false;
        offline.uptime_secs = None;
        offline.pending_tasks = None;
        offline.work_cycle_running = None;
        let text = render_status(&offline, false);
        assert!(text.contains("[--] responder not running here"));
        assert!(!text.contains("Pending tasks"));
        assert!(!text.contains("Work cycle"));
    }

    #[test]
    fn status_report_serializes() {
        let json = serde_json::to_string(&report()).unwrap();
        assert!(json.contains("\"running\":true"));
        assert!(json.contains("\"total_accounts\":4"));
    }
}
