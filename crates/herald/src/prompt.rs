// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal input: the menu line editor and the login credential prompt.

use std::str::FromStr;

use async_trait::async_trait;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use herald_core::{CredentialPrompt, HeraldError};

/// Line editor for the interactive menu.
pub struct Console {
    editor: DefaultEditor,
}

impl Console {
    pub fn new() -> Result<Self, HeraldError> {
        let editor = DefaultEditor::new()
            .map_err(|e| HeraldError::Internal(format!("failed to initialize readline: {e}")))?;
        Ok(Self { editor })
    }

    /// Reads one trimmed line. `None` on Ctrl+C, Ctrl+D, or a terminal error.
    pub fn ask(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim().to_string();
                if !trimmed.is_empty() {
                    let _ = self.editor.add_history_entry(&trimmed);
                }
                Some(trimmed)
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => None,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                None
            }
        }
    }

    /// Reads a value, printing `invalid` and returning `None` when it does
    /// not parse.
    pub fn ask_parsed<T: FromStr>(&mut self, prompt: &str, invalid: &str) -> Option<T> {
        let line = self.ask(prompt)?;
        match line.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                println!("{}", invalid.yellow());
                None
            }
        }
    }

    pub fn confirm(&mut self, prompt: &str) -> bool {
        self.ask(prompt).as_deref().is_some_and(is_yes)
    }
}

/// `y` or `yes`, any case.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Parses an optional yes/no answer; blank keeps the current value.
pub fn parse_optional_flag(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => None,
        "y" | "yes" => Some(true),
        _ => Some(false),
    }
}

/// Reads the login code and 2FA password from the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

#[async_trait]
impl CredentialPrompt for TerminalPrompt {
    async fn login_code(&self, phone: &str) -> Result<String, HeraldError> {
        let prompt = format!("Enter the code sent to {phone}: ");
        tokio::task::spawn_blocking(move || {
            let mut editor = DefaultEditor::new()
                .map_err(|e| HeraldError::Internal(format!("failed to initialize readline: {e}")))?;
            match editor.readline(&prompt) {
                Ok(code) => Ok(code.trim().to_string()),
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => Err(HeraldError::Cancelled),
                Err(e) => Err(HeraldError::Internal(format!("failed to read code: {e}"))),
            }
        })
        .await
        .map_err(|e| HeraldError::Internal(format!("code prompt failed: {e}")))?
    }

    async fn password(&self, phone: &str) -> Result<String, HeraldError> {
        let prompt = format!("Two-step verification password for {phone}: ");
        tokio::task::spawn_blocking(move || {
            rpassword::prompt_password(prompt)
                .map_err(|e| HeraldError::Internal(format!("failed to read password: {e}")))
        })
        .await
        .map_err(|e| HeraldError::Internal(format!("password prompt failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_answers() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
    }

    #[test]
    fn blank_flag_keeps_current_value() {
        assert_eq!(parse_optional_flag(""), None);
        assert_eq!(parse_optional_flag("y"), Some(true));
        assert_eq!(parse_optional_flag("no"), Some(false));
    }
}
