// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto responder screens: rule editing and starting/stopping accounts.

use std::time::Duration;

use colored::Colorize;

use herald_agent::{AccountSelection, activate_plan, plan_activation};
use herald_core::HeraldError;

use super::accounts::path_or_default;
use super::{CHOICE_PROMPT, print_invalid_choice, print_menu, print_ok, report};
use crate::app::App;
use crate::commands::{account_line, rule_lines};
use crate::prompt::{Console, parse_optional_flag};
use crate::status::format_uptime;

pub(super) async fn run(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    loop {
        print_menu(
            "Auto responder",
            &[
                ("1", "List rules"),
                ("2", "Add rule"),
                ("3", "Edit rule"),
                ("4", "Delete rule"),
                ("5", "Delete alternative response"),
                ("6", "Start auto responder"),
                ("7", "Stop auto responder"),
                ("8", "Active accounts"),
                ("9", "Export rules"),
                ("10", "Import rules"),
                ("0", "Back"),
            ],
        );
        let Some(choice) = console.ask(CHOICE_PROMPT) else {
            return Ok(());
        };
        let outcome = match choice.as_str() {
            "1" => list_rules(app).await,
            "2" => add_rule(app, console).await,
            "3" => edit_rule(app, console).await,
            "4" => delete_rule(app, console).await,
            "5" => delete_response(app, console).await,
            "6" => start(app, console).await,
            "7" => stop(app, console).await,
            "8" => active(app).await,
            "9" => export_rules(app, console).await,
            "10" => import_rules(app, console).await,
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

async fn list_rules(app: &App) -> Result<(), HeraldError> {
    let store = app.rules.read().await;
    if store.is_empty() {
        println!("No rules defined");
    }
    for line in rule_lines(store.rules()) {
        println!("{line}");
    }
    Ok(())
}

async fn add_rule(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let Some(keyword) = console.ask("Keyword: ") else {
        return Ok(());
    };
    let Some(response) = console.ask("Response: ") else {
        return Ok(());
    };
    let private_only = console.confirm("Reply in private chats only? (y/n): ");
    report(app.rules.write().await.add(&keyword, &response, private_only));
    Ok(())
}

async fn edit_rule(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    list_rules(app).await?;
    let Some(id) = console.ask("Rule ID: ") else {
        return Ok(());
    };
    if app.rules.read().await.get(&id).is_none() {
        return Err(HeraldError::not_found("rule", id));
    }
    let Some(keyword) = console.ask("New keyword (blank keeps current): ") else {
        return Ok(());
    };
    let Some(response) = console.ask("Additional response (blank adds none): ") else {
        return Ok(());
    };
    let Some(flag) = console.ask("Private chats only? (y/n, blank keeps current): ") else {
        return Ok(());
    };
    report(app.rules.write().await.update(
        &id,
        Some(keyword.as_str()),
        Some(response.as_str()),
        parse_optional_flag(&flag),
    ));
    Ok(())
}

async fn delete_rule(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    list_rules(app).await?;
    let Some(id) = console.ask("Rule ID to delete: ") else {
        return Ok(());
    };
    report(app.rules.write().await.delete(&id));
    Ok(())
}

async fn delete_response(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    list_rules(app).await?;
    let Some(id) = console.ask("Rule ID: ") else {
        return Ok(());
    };
    let Some(number) = console.ask_parsed::<usize>("Response number to delete: ", "Invalid response number")
    else {
        return Ok(());
    };
    let index = number
        .checked_sub(1)
        .ok_or_else(|| HeraldError::Validation("Invalid response index".into()))?;
    report(app.rules.write().await.delete_response(&id, index));
    Ok(())
}

async fn start(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    if app.rules.read().await.is_empty() {
        return Err(HeraldError::Validation(
            "No rules defined. Add at least one rule first".into(),
        ));
    }
    let accounts = app.service.list().await?;
    if accounts.is_empty() {
        return Err(HeraldError::Validation("No accounts found".into()));
    }
    for account in &accounts {
        println!("{}", account_line(account));
    }

    print_menu(
        "Start on",
        &[
            ("1", "One account"),
            ("2", "All accounts"),
            ("3", "Random accounts"),
        ],
    );
    let Some(choice) = console.ask(CHOICE_PROMPT) else {
        return Ok(());
    };
    let selection = match choice.as_str() {
        "1" => {
            let Some(id) = console.ask_parsed::<i64>("Account ID: ", "Invalid account ID") else {
                return Ok(());
            };
            AccountSelection::Specific(id)
        }
        "2" => AccountSelection::All,
        "3" => {
            let Some(n) = console.ask_parsed::<usize>("Number of accounts: ", "Invalid number")
            else {
                return Ok(());
            };
            AccountSelection::Random(n)
        }
        _ => {
            print_invalid_choice();
            return Ok(());
        }
    };

    let Some(answer) = console.ask("Total response window in minutes: ") else {
        return Ok(());
    };
    let window = parse_window(&answer)?;

    let mut rng = rand::thread_rng();
    let selected = selection.pick(&accounts, &mut rng)?;
    let plan = plan_activation(selected, window, app.runtime.policy(), &mut rng);
    for planned in &plan {
        println!(
            "  {} base delay {:.1}s",
            planned.account.phone,
            planned.base_delay.as_secs_f64()
        );
    }

    let outcome = activate_plan(&app.runtime, app.service.factory().as_ref(), plan).await?;
    print_ok(outcome.summary());
    for (phone, reason) in &outcome.skipped {
        println!("  {} {phone}: {reason}", "skipped".yellow());
    }
    Ok(())
}

async fn stop(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let sessions = app.runtime.active_accounts().await;
    if sessions.is_empty() {
        println!("No active accounts");
        return Ok(());
    }
    active(app).await?;
    let Some(answer) = console.ask("Phone to stop, or 'all': ") else {
        return Ok(());
    };
    if answer.eq_ignore_ascii_case("all") {
        if console.confirm("Stop every active account? (y/n): ") {
            let stopped = app.runtime.stop_all().await;
            print_ok(format!("Auto-responder stopped on {stopped} account(s)"));
        }
        return Ok(());
    }
    report(app.runtime.deactivate(&answer).await);
    Ok(())
}

async fn active(app: &App) -> Result<(), HeraldError> {
    let sessions = app.runtime.active_accounts().await;
    if sessions.is_empty() {
        println!("No active accounts");
        return Ok(());
    }
    for info in sessions {
        let line = format!(
            "{}. {} base delay {:.1}s, active {}, {} queued",
            info.account_id,
            info.phone,
            info.base_delay.as_secs_f64(),
            format_uptime(info.active_for.as_secs()),
            info.pending
        );
        if info.listening {
            println!("{line}");
        } else {
            println!("{line} {}", "(not receiving messages)".red());
        }
    }
    Ok(())
}

async fn export_rules(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let default = &app.config.rules.export_file;
    let Some(answer) = console.ask(&format!("Export file [{default}]: ")) else {
        return Ok(());
    };
    let path = path_or_default(&answer, default);
    report(app.rules.read().await.export(&path));
    Ok(())
}

async fn import_rules(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let default = &app.config.rules.export_file;
    let Some(answer) = console.ask(&format!("Import file [{default}]: ")) else {
        return Ok(());
    };
    let path = path_or_default(&answer, default);
    let replace = console.confirm("Replace the current rules? (y/n, 'n' merges): ");
    report(app.rules.write().await.import(&path, replace));
    Ok(())
}

/// Parses the total response window entered in (possibly fractional) minutes.
fn parse_window(answer: &str) -> Result<Duration, HeraldError> {
    let minutes: f64 = answer.trim().parse().map_err(|_| {
        HeraldError::Validation("Response window must be a number of minutes".into())
    })?;
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(HeraldError::Validation(
            "Response window must be greater than zero".into(),
        ));
    }
    Duration::try_from_secs_f64(minutes * 60.0)
        .map_err(|_| HeraldError::Validation("Response window is too large".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_accepts_fractional_minutes() {
        assert_eq!(parse_window("2.5").unwrap(), Duration::from_secs(150));
        assert_eq!(parse_window(" 10 ").unwrap(), Duration::from_secs(600));
    }

    #[test]
    fn window_rejects_non_positive_or_garbage() {
        assert!(parse_window("0").is_err());
        assert!(parse_window("-3").is_err());
        assert!(parse_window("soon").is_err());
        assert!(parse_window("inf").is_err());
    }

    #[test]
    fn huge_window_is_rejected_without_panicking() {
        let err = parse_window("1e30").unwrap_err();
        assert!(err.to_string().contains("too large"), "{err}");
    }
}
