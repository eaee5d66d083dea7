// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::HeraldConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration, collecting every problem.
pub fn validate_config(config: &HeraldConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "app.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.app.log_level
        )));
    }

    for (key, value) in [
        ("app.log_dir", &config.app.log_dir),
        ("storage.database_path", &config.storage.database_path),
        ("rules.rules_file", &config.rules.rules_file),
        ("rules.export_file", &config.rules.export_file),
        ("rules.default_response", &config.rules.default_response),
        ("accounts.export_file", &config.accounts.export_file),
        ("tasks.tasks_file", &config.tasks.tasks_file),
    ] {
        if value.trim().is_empty() {
            errors.push(ConfigError::validation(format!("{key} must not be empty")));
        }
    }

    let r = &config.responder;
    for (name, min, max) in [
        ("delay_jitter", r.delay_jitter_min, r.delay_jitter_max),
        (
            "cooldown_penalty",
            r.cooldown_penalty_min_secs,
            r.cooldown_penalty_max_secs,
        ),
        ("typing_jitter", r.typing_jitter_min, r.typing_jitter_max),
        (
            "activation_spread",
            r.activation_spread_min,
            r.activation_spread_max,
        ),
    ] {
        check_range(&mut errors, name, min, max);
    }

    if !(r.typing_chars_per_sec > 0.0) {
        errors.push(ConfigError::validation(format!(
            "responder.typing_chars_per_sec must be positive, got {}",
            r.typing_chars_per_sec
        )));
    }
    if !(r.typing_max_secs >= 0.0) {
        errors.push(ConfigError::validation(format!(
            "responder.typing_max_secs must be non-negative, got {}",
            r.typing_max_secs
        )));
    }
    if !(r.cooldown_window_secs >= 0.0) {
        errors.push(ConfigError::validation(format!(
            "responder.cooldown_window_secs must be non-negative, got {}",
            r.cooldown_window_secs
        )));
    }
    if r.poll_interval_ms == 0 {
        errors.push(ConfigError::validation(
            "responder.poll_interval_ms must be at least 1",
        ));
    }
    if config.work_cycle.interval_secs == 0 {
        errors.push(ConfigError::validation(
            "work_cycle.interval_secs must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_range(errors: &mut Vec<ConfigError>, name: &str, min: f64, max: f64) {
    if !(min >= 0.0) {
        errors.push(ConfigError::validation(format!(
            "responder.{name}_min must be non-negative, got {min}"
        )));
    }
    if !(min <= max) {
        errors.push(ConfigError::validation(format!(
            "responder.{name}_min ({min}) must not exceed responder.{name}_max ({max})"
        )));
    }
}
