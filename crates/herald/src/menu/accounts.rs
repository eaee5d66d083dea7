// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account management screens.

use std::path::PathBuf;

use colored::Colorize;

use herald_core::{AccountStore, ConnectionStatus, HeraldError};

use super::{CHOICE_PROMPT, print_invalid_choice, print_menu, print_ok, report};
use crate::app::App;
use crate::commands::{account_line, export_message, import_message};
use crate::prompt::{Console, TerminalPrompt};

pub(super) async fn run(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    loop {
        print_menu(
            "Accounts",
            &[
                ("1", "Add account"),
                ("2", "List accounts"),
                ("3", "Test connections"),
                ("4", "Delete account"),
                ("5", "Update account"),
                ("6", "Export accounts"),
                ("7", "Import accounts"),
                ("0", "Back"),
            ],
        );
        let Some(choice) = console.ask(CHOICE_PROMPT) else {
            return Ok(());
        };
        let outcome = match choice.as_str() {
            "1" => add(app, console).await,
            "2" => list(app).await,
            "3" => test_connections(app, console).await,
            "4" => delete(app, console).await,
            "5" => update(app, console).await,
            "6" => export(app, console).await,
            "7" => import(app, console).await,
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

async fn add(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let Some(api_id) = console.ask_parsed::<i64>("API ID: ", "API ID must be a number") else {
        return Ok(());
    };
    let Some(api_hash) = console.ask("API hash: ") else {
        return Ok(());
    };
    let Some(phone) = console.ask("Phone number: ") else {
        return Ok(());
    };

    let account = app
        .service
        .register(api_id, &api_hash, &phone, &TerminalPrompt)
        .await?;
    print_ok(format!("Account {} added", account.label()));
    Ok(())
}

async fn list(app: &App) -> Result<(), HeraldError> {
    let accounts = app.service.list().await?;
    if accounts.is_empty() {
        println!("No accounts found");
        return Ok(());
    }
    for account in &accounts {
        let line = account_line(account);
        if app.runtime.is_active(&account.phone).await {
            println!("{line} {}", "(active)".green());
        } else {
            println!("{line}");
        }
    }
    Ok(())
}

async fn test_connections(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let reports = app.service.test_connections().await?;
    if reports.is_empty() {
        println!("No accounts found");
        return Ok(());
    }
    for report in &reports {
        let status = match &report.status {
            ConnectionStatus::Authorized => report.status.to_string().green(),
            _ => report.status.to_string().red(),
        };
        println!("{}. {}: {status}", report.account_id, report.phone);
    }

    let failed: Vec<_> = reports.iter().filter(|r| !r.is_ok()).collect();
    if failed.is_empty() {
        return Ok(());
    }
    if !console.confirm(&format!("Repair {} failed account(s)? (y/n): ", failed.len())) {
        return Ok(());
    }
    for report in failed {
        println!("Repairing {}", report.phone);
        match app.service.repair(report.account_id, &TerminalPrompt).await {
            Ok(account) => print_ok(format!("Account {} repaired", account.label())),
            Err(e) => super::print_error(&e),
        }
    }
    Ok(())
}

async fn delete(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    list(app).await?;
    let Some(id) = console.ask_parsed::<i64>("Account ID to delete: ", "Invalid account ID") else {
        return Ok(());
    };
    if !console.confirm("Delete this account? (y/n): ") {
        return Ok(());
    }
    if let Some(account) = app.service.store().get_account(id).await?
        && app.runtime.is_active(&account.phone).await
    {
        report(app.runtime.deactivate(&account.phone).await);
    }
    report(app.service.delete(id).await);
    Ok(())
}

async fn update(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    list(app).await?;
    let Some(id) = console.ask_parsed::<i64>("Account ID to update: ", "Invalid account ID") else {
        return Ok(());
    };
    let account = app.service.refresh(id, &TerminalPrompt).await?;
    print_ok(format!("Account {} updated", account.label()));
    Ok(())
}

async fn export(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let default = &app.config.accounts.export_file;
    let Some(answer) = console.ask(&format!("Export file [{default}]: ")) else {
        return Ok(());
    };
    let path = path_or_default(&answer, default);
    report(export_message(app.accounts.as_ref(), &path).await);
    Ok(())
}

async fn import(app: &App, console: &mut Console) -> Result<(), HeraldError> {
    let default = &app.config.accounts.export_file;
    let Some(answer) = console.ask(&format!("Import file [{default}]: ")) else {
        return Ok(());
    };
    let path = path_or_default(&answer, default);
    report(
        import_message(
            app.accounts.as_ref(),
            &path,
            app.config.accounts.default_2fa.as_deref(),
        )
        .await,
    );
    Ok(())
}

/// The typed path, or `default` when the answer is blank.
pub(super) fn path_or_default(answer: &str, default: &str) -> PathBuf {
    if answer.trim().is_empty() {
        PathBuf::from(default)
    } else {
        PathBuf::from(answer.trim())
    }
}
