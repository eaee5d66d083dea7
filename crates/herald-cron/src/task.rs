// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled task records and their execution.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use herald_core::HeraldError;

/// What a task does when it fires. Persisted as `1`, `2`, or `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskKind {
    /// Shell command.
    Command,
    /// Python script run through the shell.
    Script,
    /// Message shown to the operator.
    Reminder,
}

impl TryFrom<u8> for TaskKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Command),
            2 => Ok(Self::Script),
            3 => Ok(Self::Reminder),
            other => Err(format!("unknown task type {other}")),
        }
    }
}

impl From<TaskKind> for u8 {
    fn from(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Command => 1,
            TaskKind::Script => 2,
            TaskKind::Reminder => 3,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Command => "Command",
            Self::Script => "Script",
            Self::Reminder => "Reminder",
        })
    }
}

/// What to run, before it is given a name and a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub kind: TaskKind,
    pub command: String,
}

impl TaskSpec {
    pub fn command(command: &str) -> Self {
        Self {
            kind: TaskKind::Command,
            command: command.trim().to_string(),
        }
    }

    pub fn script(path: &str, args: &str) -> Self {
        let command = format!("python {} {}", path.trim(), args.trim());
        Self {
            kind: TaskKind::Script,
            command: command.trim_end().to_string(),
        }
    }

    pub fn reminder(message: &str) -> Self {
        Self {
            kind: TaskKind::Reminder,
            command: format!("REMINDER: {}", message.trim()),
        }
    }
}

/// A task as stored in the tasks file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub command: String,
    /// Local wall-clock time the task fires at.
    pub execute_at: NaiveDateTime,
    #[serde(default)]
    pub executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ScheduledTask {
    pub fn status(&self) -> &'static str {
        if self.executed { "Executed" } else { "Pending" }
    }
}

/// Runs the task and renders its outcome as a one-line result.
pub async fn execute(kind: TaskKind, command: &str) -> String {
    match kind {
        TaskKind::Reminder => command.to_string(),
        TaskKind::Command => match run_shell(command).await {
            Ok((true, stdout, _)) => format!("Success: {stdout}"),
            Ok((false, _, stderr)) => format!("Error: {stderr}"),
            Err(e) => format!("Execution error: {e}"),
        },
        TaskKind::Script => match run_shell(command).await {
            Ok((true, stdout, _)) => format!("Script executed: {stdout}"),
            Ok((false, _, stderr)) => format!("Script error: {stderr}"),
            Err(e) => format!("Execution error: {e}"),
        },
    }
}

async fn run_shell(command: &str) -> Result<(bool, String, String), HeraldError> {
    debug!(command, "running task command");
    let output = shell(command)
        .output()
        .await
        .map_err(|e| HeraldError::Internal(format!("failed to spawn shell: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Ok((output.status.success(), stdout, stderr))
}

#[cfg(unix)]
fn shell(command: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
