// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Non-interactive `rules` and `accounts` subcommands.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use herald_config::HeraldConfig;
use herald_core::{Account, AccountStore, HeraldError};
use herald_rules::{RuleSet, RuleStore};
use herald_storage::{SqliteAccountStore, export_accounts, import_accounts};

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// Print every rule and its responses.
    List,
    /// Write the rules to a JSON file.
    Export {
        /// Destination (defaults to `rules.export_file`).
        path: Option<PathBuf>,
    },
    /// Read rules from a JSON file.
    Import {
        path: PathBuf,
        /// Replace the current rules instead of merging.
        #[arg(long)]
        replace: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountsAction {
    /// Print every stored account.
    List,
    /// Write the accounts to a JSON file.
    Export {
        /// Destination (defaults to `accounts.export_file`).
        path: Option<PathBuf>,
    },
    /// Upsert accounts from a JSON file.
    Import { path: PathBuf },
}

pub fn run_rules(config: &HeraldConfig, action: RulesAction) -> Result<(), HeraldError> {
    let mut store = RuleStore::open(&config.rules.rules_file, config.rules.default_response.clone());
    match action {
        RulesAction::List => {
            if store.is_empty() {
                println!("No rules defined");
            }
            for line in rule_lines(store.rules()) {
                println!("{line}");
            }
        }
        RulesAction::Export { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(&config.rules.export_file));
            println!("{}", store.export(&path)?);
        }
        RulesAction::Import { path, replace } => {
            println!("{}", store.import(&path, replace)?);
        }
    }
    Ok(())
}

pub async fn run_accounts(config: &HeraldConfig, action: AccountsAction) -> Result<(), HeraldError> {
    let store = SqliteAccountStore::open(&config.storage).await?;
    match action {
        AccountsAction::List => {
            let accounts = store.list_accounts().await?;
            if accounts.is_empty() {
                println!("No accounts found");
            }
            for account in &accounts {
                println!("{}", account_line(account));
            }
        }
        AccountsAction::Export { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(&config.accounts.export_file));
            println!("{}", export_message(&store, &path).await?);
        }
        AccountsAction::Import { path } => {
            println!(
                "{}",
                import_message(&store, &path, config.accounts.default_2fa.as_deref()).await?
            );
        }
    }
    Ok(())
}

/// Exports accounts and describes the outcome.
pub async fn export_message(store: &dyn AccountStore, path: &Path) -> Result<String, HeraldError> {
    let summary = export_accounts(store, path).await?;
    let mut message = format!(
        "Exported {} accounts to {}",
        summary.exported,
        path.display()
    );
    if !summary.verified {
        message.push_str(" (verification failed, check the file)");
    }
    Ok(message)
}

/// Imports accounts and describes the outcome.
pub async fn import_message(
    store: &dyn AccountStore,
    path: &Path,
    default_twofa: Option<&str>,
) -> Result<String, HeraldError> {
    let summary = import_accounts(store, path, default_twofa).await?;
    Ok(format!(
        "Imported {} of {} accounts ({} failed, {} skipped); {} new, {} total",
        summary.imported,
        summary.total,
        summary.failed,
        summary.skipped,
        summary.added(),
        summary.count_after
    ))
}

/// One line per rule followed by its numbered responses.
pub fn rule_lines(rules: &RuleSet) -> Vec<String> {
    let mut lines = Vec::new();
    for (id, rule) in rules {
        let scope = if rule.private_only { " [private only]" } else { "" };
        lines.push(format!("{id}. '{}'{scope}", rule.keyword));
        for (index, response) in rule.responses.iter().enumerate() {
            lines.push(format!("    {}) {response}", index + 1));
        }
    }
    lines
}

pub fn account_line(account: &Account) -> String {
    format!("{}. {}", account.id, account.label())
}
