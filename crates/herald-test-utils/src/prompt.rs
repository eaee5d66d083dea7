// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted operator input for login flows.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use herald_core::{CredentialPrompt, HeraldError};

/// Answers login-code and password prompts from fixed queues.
///
/// An exhausted queue answers with `HeraldError::Cancelled`, like an
/// operator pressing Ctrl+D.
#[derive(Default)]
pub struct ScriptedPrompt {
    codes: Mutex<VecDeque<String>>,
    passwords: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(self, code: &str) -> Self {
        push(&self.codes, code);
        self
    }

    pub fn with_password(self, password: &str) -> Self {
        push(&self.passwords, password);
        self
    }

    /// Prompts shown so far, as `"code:<phone>"` or `"password:<phone>"`.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn next_code(&self, phone: &str) -> Result<String, HeraldError> {
        self.record(format!("code:{phone}"));
        pop(&self.codes)
    }

    pub fn next_password(&self, phone: &str) -> Result<String, HeraldError> {
        self.record(format!("password:{phone}"));
        pop(&self.passwords)
    }

    fn record(&self, entry: String) {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(entry);
        }
    }
}

fn push(queue: &Mutex<VecDeque<String>>, value: &str) {
    if let Ok(mut queue) = queue.lock() {
        queue.push_back(value.to_string());
    }
}

fn pop(queue: &Mutex<VecDeque<String>>) -> Result<String, HeraldError> {
    queue
        .lock()
        .ok()
        .and_then(|mut q| q.pop_front())
        .ok_or(HeraldError::Cancelled)
}

#[async_trait]
impl CredentialPrompt for ScriptedPrompt {
    async fn login_code(&self, phone: &str) -> Result<String, HeraldError> {
        self.next_code(phone)
    }

    async fn password(&self, phone: &str) -> Result<String, HeraldError> {
        self.next_password(phone)
    }
}
