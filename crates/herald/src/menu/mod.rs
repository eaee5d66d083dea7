// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive text menu.
//!
//! Launches a numbered menu with colored output and readline history.
//! Errors from an action are printed and the menu carries on.

mod accounts;
mod responder;
mod tasks;

use std::fmt::Display;
use std::io::IsTerminal;

use colored::Colorize;
use tokio_util::sync::CancellationToken;

use herald_core::HeraldError;

use crate::app::App;
use crate::prompt::Console;
use crate::status::render_status;

pub(crate) const CHOICE_PROMPT: &str = "Select an option: ";

/// Runs the main menu until the operator exits or `shutdown` fires.
pub async fn run_menu(app: &App, shutdown: &CancellationToken) -> Result<(), HeraldError> {
    let mut console = Console::new()?;

    println!("{}", "herald".bold().green());
    println!("Multi-account auto-responder. Press Ctrl+C to exit.\n");

    loop {
        if shutdown.is_cancelled() {
            break;
        }
        report_task_events(app);
        print_menu(
            "Main menu",
            &[
                ("1", "Accounts"),
                ("2", "Auto responder"),
                ("3", "Task scheduling"),
                ("4", "Work cycle"),
                ("5", "Status"),
                ("0", "Exit"),
            ],
        );
        let Some(choice) = console.ask(CHOICE_PROMPT) else {
            break;
        };
        if shutdown.is_cancelled() {
            break;
        }
        let outcome = match choice.as_str() {
            "1" => accounts::run(app, &mut console).await,
            "2" => responder::run(app, &mut console).await,
            "3" => tasks::run(app, &mut console).await,
            "4" => work_cycle(app, &mut console).await,
            "5" => show_status(app).await,
            "0" | "q" | "quit" | "exit" => break,
            _ => {
                print_invalid_choice();
                continue;
            }
        };
        if let Err(e) = outcome {
            print_error(&e);
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

async fn show_status(app: &App) -> Result<(), HeraldError> {
    let report = app.status().await?;
    print!("{}", render_status(&report, std::io::stdout().is_terminal()));
    Ok(())
}

async fn work_cycle(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    loop {
        print_menu(
            "Work cycle",
            &[("1", "Start"), ("2", "Stop"), ("3", "Status"), ("0", "Back")],
        );
        let Some(choice) = console.ask(CHOICE_PROMPT) else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => print_ok(app.work_cycle.start().await),
            "2" => print_ok(app.work_cycle.stop().await),
            "3" => {
                let status = app.work_cycle.status().await;
                let state = if status.running { "running" } else { "stopped" };
                println!("Work cycle {state}, iteration {}", status.iteration);
            }
            "0" => return Ok(()),
            _ => print_invalid_choice(),
        }
    }
}

/// Prints scheduled task results that arrived since the last menu screen.
fn report_task_events(app: &App) {
    for event in app.drain_task_events() {
        println!(
            "{} task {} '{}' finished at {}: {}",
            "[task]".cyan(),
            event.id,
            event.name,
            event.finished_at.format("%H:%M:%S"),
            event.result
        );
    }
}

pub(crate) fn print_menu(title: &str, entries: &[(&str, &str)]) {
    println!();
    println!("{}", title.bold());
    for (key, label) in entries {
        println!("  {}. {label}", key.yellow());
    }
}

pub(crate) fn print_ok(message: impl Display) {
    println!("{}", message.to_string().green());
}

pub(crate) fn print_error(error: &HeraldError) {
    eprintln!("{}: {error}", "error".red());
}

pub(crate) fn print_invalid_choice() {
    println!("{}", "Invalid choice".yellow());
}

/// Prints the message of a successful action or the error.
pub(crate) fn report(result: Result<String, HeraldError>) {
    match result {
        Ok(message) => print_ok(message),
        Err(e) => print_error(&e),
    }
}
