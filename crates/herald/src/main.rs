// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Herald - a multi-account messaging auto-responder.
//!
//! This is the binary entry point: configuration, logging, and the
//! operator commands.

mod app;
mod commands;
mod logging;
mod menu;
mod prompt;
mod status;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::error;

use herald_agent::install_signal_handler;
use herald_config::HeraldConfig;
use herald_core::HeraldError;
use herald_telegram::TelegramClientFactory;

use crate::app::App;
use crate::commands::{AccountsAction, RulesAction};

/// Herald - a multi-account messaging auto-responder.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive menu (default).
    Menu,
    /// Show stored accounts, rules, and responder state.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Inspect, export, or import responder rules.
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
    /// Inspect, export, or import stored accounts.
    Accounts {
        #[command(subcommand)]
        action: AccountsAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match herald_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            herald_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let command = cli.command.unwrap_or(Commands::Menu);
    let interactive = matches!(command, Commands::Menu);
    let _log_guard = logging::init_tracing(&config.app, !interactive);

    let result = match command {
        Commands::Menu => run_interactive(config).await,
        Commands::Status { json, plain } => status::run_status(&config, json, plain).await,
        Commands::Rules { action } => commands::run_rules(&config, action),
        Commands::Accounts { action } => commands::run_accounts(&config, action).await,
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Runs the menu with signal-driven shutdown.
///
/// A signal stops every active account even while the menu is waiting for
/// input, then ends the process.
async fn run_interactive(config: HeraldConfig) -> Result<(), HeraldError> {
    let app = Arc::new(App::open(config, Arc::new(TelegramClientFactory)).await?);
    let shutdown = install_signal_handler();
    let menu_done = CancellationToken::new();

    let watcher = {
        let app = app.clone();
        let shutdown = shutdown.clone();
        let menu_done = menu_done.clone();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            app.shutdown().await;
            if !menu_done.is_cancelled() {
                eprintln!("herald: stopped by signal");
                std::process::exit(0);
            }
        })
    };

    let result = menu::run_menu(&app, &shutdown).await;
    menu_done.cancel();
    shutdown.cancel();
    if let Err(e) = watcher.await {
        error!(error = %e, "shutdown task failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn menu_is_the_default_command() {
        let cli = Cli::parse_from(["herald"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn rules_import_parses_replace_flag() {
        let cli = Cli::parse_from(["herald", "rules", "import", "rules.json", "--replace"]);
        match cli.command {
            Some(Commands::Rules {
                action: RulesAction::Import { path, replace },
            }) => {
                assert_eq!(path, std::path::PathBuf::from("rules.json"));
                assert!(replace);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = herald_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.rules.rules_file, "responder_rules.json");
    }
}
