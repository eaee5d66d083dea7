// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Herald.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Herald configuration.
///
/// Every section is optional and defaults to the values the responder has
/// always used.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    /// Logging settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Account database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Rule file locations.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Humanized delivery timing.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Account registration defaults.
    #[serde(default)]
    pub accounts: AccountsConfig,

    /// Scheduled task persistence.
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Background work cycle.
    #[serde(default)]
    pub work_cycle: WorkCycleConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory receiving the daily rolling log file.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

/// Account database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite account database.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    "accounts/accounts.db".to_string()
}

fn default_true() -> bool {
    true
}

/// Rule persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// JSON document holding the rule set.
    #[serde(default = "default_rules_file")]
    pub rules_file: String,

    /// Default destination for rule exports.
    #[serde(default = "default_rules_export_file")]
    pub export_file: String,

    /// Response inserted when the last alternative of a rule is deleted.
    #[serde(default = "default_response")]
    pub default_response: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            rules_file: default_rules_file(),
            export_file: default_rules_export_file(),
            default_response: default_response(),
        }
    }
}

fn default_rules_file() -> String {
    "responder_rules.json".to_string()
}

fn default_rules_export_file() -> String {
    "responder_rules_export.json".to_string()
}

fn default_response() -> String {
    "Default response".to_string()
}

/// Delivery timing policy.
///
/// These are the knobs behind the responder's humanized pacing. Ranges are
/// sampled uniformly.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResponderConfig {
    /// How long the delivery worker waits for a queue item before re-checking
    /// for shutdown.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Lower bound of the multiplier applied to the account's base delay.
    #[serde(default = "default_delay_jitter_min")]
    pub delay_jitter_min: f64,

    /// Upper bound of the multiplier applied to the account's base delay.
    #[serde(default = "default_delay_jitter_max")]
    pub delay_jitter_max: f64,

    /// Replies closer together than this incur the cooldown penalty.
    #[serde(default = "default_cooldown_window_secs")]
    pub cooldown_window_secs: f64,

    #[serde(default = "default_cooldown_penalty_min_secs")]
    pub cooldown_penalty_min_secs: f64,

    #[serde(default = "default_cooldown_penalty_max_secs")]
    pub cooldown_penalty_max_secs: f64,

    /// Simulated typing speed.
    #[serde(default = "default_typing_chars_per_sec")]
    pub typing_chars_per_sec: f64,

    /// Cap on the typing duration before jitter.
    #[serde(default = "default_typing_max_secs")]
    pub typing_max_secs: f64,

    #[serde(default = "default_typing_jitter_min")]
    pub typing_jitter_min: f64,

    #[serde(default = "default_typing_jitter_max")]
    pub typing_jitter_max: f64,

    /// Pause between the typing indicator ending and the reply being sent.
    #[serde(default = "default_send_pacing_ms")]
    pub send_pacing_ms: u64,

    /// Pause after a failed delivery before the next queue item.
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,

    /// Spread applied when splitting a total response window across accounts.
    #[serde(default = "default_activation_spread_min")]
    pub activation_spread_min: f64,

    #[serde(default = "default_activation_spread_max")]
    pub activation_spread_max: f64,

    /// Pause between activating consecutive accounts.
    #[serde(default = "default_activation_stagger_ms")]
    pub activation_stagger_ms: u64,
}

impl ResponderConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn send_pacing(&self) -> Duration {
        Duration::from_millis(self.send_pacing_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn activation_stagger(&self) -> Duration {
        Duration::from_millis(self.activation_stagger_ms)
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            delay_jitter_min: default_delay_jitter_min(),
            delay_jitter_max: default_delay_jitter_max(),
            cooldown_window_secs: default_cooldown_window_secs(),
            cooldown_penalty_min_secs: default_cooldown_penalty_min_secs(),
            cooldown_penalty_max_secs: default_cooldown_penalty_max_secs(),
            typing_chars_per_sec: default_typing_chars_per_sec(),
            typing_max_secs: default_typing_max_secs(),
            typing_jitter_min: default_typing_jitter_min(),
            typing_jitter_max: default_typing_jitter_max(),
            send_pacing_ms: default_send_pacing_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            activation_spread_min: default_activation_spread_min(),
            activation_spread_max: default_activation_spread_max(),
            activation_stagger_ms: default_activation_stagger_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_delay_jitter_min() -> f64 {
    0.5
}

fn default_delay_jitter_max() -> f64 {
    1.5
}

fn default_cooldown_window_secs() -> f64 {
    30.0
}

fn default_cooldown_penalty_min_secs() -> f64 {
    10.0
}

fn default_cooldown_penalty_max_secs() -> f64 {
    40.0
}

fn default_typing_chars_per_sec() -> f64 {
    5.0
}

fn default_typing_max_secs() -> f64 {
    10.0
}

fn default_typing_jitter_min() -> f64 {
    0.8
}

fn default_typing_jitter_max() -> f64 {
    1.2
}

fn default_send_pacing_ms() -> u64 {
    500
}

fn default_error_backoff_ms() -> u64 {
    1000
}

fn default_activation_spread_min() -> f64 {
    0.8
}

fn default_activation_spread_max() -> f64 {
    1.2
}

fn default_activation_stagger_ms() -> u64 {
    200
}

/// Account registration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountsConfig {
    /// Two-step verification password tried before prompting, and assigned
    /// to imported accounts that carry none.
    #[serde(default)]
    pub default_2fa: Option<String>,

    /// Default destination for account exports.
    #[serde(default = "default_accounts_export_file")]
    pub export_file: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            default_2fa: None,
            export_file: default_accounts_export_file(),
        }
    }
}

fn default_accounts_export_file() -> String {
    "accounts_export.json".to_string()
}

/// Scheduled task configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TasksConfig {
    /// JSON document holding scheduled tasks.
    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            tasks_file: default_tasks_file(),
        }
    }
}

fn default_tasks_file() -> String {
    "tasks_data.json".to_string()
}

/// Background work cycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkCycleConfig {
    /// Seconds between iterations.
    #[serde(default = "default_work_cycle_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WorkCycleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_work_cycle_interval_secs(),
        }
    }
}

fn default_work_cycle_interval_secs() -> u64 {
    10
}
