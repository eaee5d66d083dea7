// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task scheduling screens.

use std::time::Duration;

use colored::Colorize;

use herald_core::HeraldError;
use herald_cron::TaskSpec;

use super::{CHOICE_PROMPT, print_invalid_choice, print_menu, report};
use crate::app::App;
use crate::prompt::Console;

pub(super) async fn run(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    loop {
        print_menu(
            "Task scheduling",
            &[
                ("1", "Schedule task"),
                ("2", "List tasks"),
                ("3", "Delete task"),
                ("4", "Run task now"),
                ("0", "Back"),
            ],
        );
        let Some(choice) = console.ask(CHOICE_PROMPT) else {
            return Ok(());
        };
        let outcome = match choice.as_str() {
            "1" => schedule(app, console).await,
            "2" => list(app).await,
            "3" => delete(app, console).await,
            "4" => run_now(app, console).await,
            "0" => return Ok(()),
            _ => {
                print_invalid_choice();
                continue;
            }
        };
        if let Err(e) = outcome {
            super::print_error(&e);
        }
    }
}

async fn schedule(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let Some(name) = console.ask("Task name: ") else {
        return Ok(());
    };
    print_menu(
        "Task type",
        &[("1", "Shell command"), ("2", "Python script"), ("3", "Reminder")],
    );
    let Some(kind) = console.ask(CHOICE_PROMPT) else {
        return Ok(());
    };
    let spec = match kind.as_str() {
        "1" => {
            let Some(command) = console.ask("Command: ") else {
                return Ok(());
            };
            TaskSpec::command(&command)
        }
        "2" => {
            let Some(path) = console.ask("Script path: ") else {
                return Ok(());
            };
            let Some(args) = console.ask("Arguments (optional): ") else {
                return Ok(());
            };
            TaskSpec::script(&path, &args)
        }
        "3" => {
            let Some(message) = console.ask("Reminder message: ") else {
                return Ok(());
            };
            TaskSpec::reminder(&message)
        }
        _ => {
            print_invalid_choice();
            return Ok(());
        }
    };
    let Some(answer) = console.ask("Run in how many minutes? ") else {
        return Ok(());
    };
    let delay = parse_minutes(&answer)?;
    report(app.scheduler.add(&name, spec, delay).await);
    Ok(())
}

async fn list(app: &App) -> Result<(), HeraldError> {
    let tasks = app.scheduler.list().await;
    if tasks.is_empty() {
        println!("No scheduled tasks");
        return Ok(());
    }
    for (id, task) in tasks {
        let status = if task.executed {
            task.status().dimmed()
        } else {
            task.status().cyan()
        };
        println!(
            "{id}. {} [{}] at {} {status}",
            task.name,
            task.kind,
            task.execute_at.format("%Y-%m-%d %H:%M:%S")
        );
        println!("    {}", task.command);
        if let Some(result) = &task.result {
            println!("    -> {result}");
        }
    }
    Ok(())
}

async fn delete(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let Some(id) = console.ask_parsed::<u64>("Task ID to delete: ", "Invalid task ID") else {
        return Ok(());
    };
    report(app.scheduler.delete(id).await);
    Ok(())
}

async fn run_now(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let Some(id) = console.ask_parsed::<u64>("Task ID to run: ", "Invalid task ID") else {
        return Ok(());
    };
    report(app.scheduler.execute_now(id).await);
    Ok(())
}

/// Parses a delay entered in (possibly fractional) minutes.
fn parse_minutes(answer: &str) -> Result<Duration, HeraldError> {
    let minutes: f64 = answer
        .trim()
        .parse()
        .map_err(|_| HeraldError::Validation("Delay must be a number of minutes".into()))?;
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(HeraldError::Validation(
            "Delay must not be negative".into(),
        ));
    }
    Duration::try_from_secs_f64(minutes * 60.0)
        .map_err(|_| HeraldError::Validation("Delay is too large".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_convert_to_duration() {
        assert_eq!(parse_minutes("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_minutes("1.5").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn negative_or_garbage_minutes_are_rejected() {
        assert!(parse_minutes("-1").is_err());
        assert!(parse_minutes("later").is_err());
        assert!(parse_minutes("NaN").is_err());
        assert!(parse_minutes("1e30").is_err());
    }
}
