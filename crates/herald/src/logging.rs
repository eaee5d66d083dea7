// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup.
//!
//! Every command writes to a daily rolling file under `app.log_dir`
//! (`herald.log.YYYY-MM-DD`). Non-interactive commands also log to stderr;
//! the interactive menu keeps the terminal for itself.

use herald_config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "herald.log";

/// Filter used when `RUST_LOG` is not set.
fn default_directives(log_level: &str) -> String {
    format!("herald={log_level},warn")
}

/// Initializes the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process. `None` means the log directory could not be
/// created and only console logging (if requested) is active.
pub fn init_tracing(config: &AppConfig, console: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let (file_layer, guard) = match std::fs::create_dir_all(&config.log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!(
                "herald: cannot create log directory {}: {e}",
                config.log_dir
            );
            (None, None)
        }
    };

    let console_layer = console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
