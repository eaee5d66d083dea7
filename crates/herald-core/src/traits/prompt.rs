// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator prompt trait used by login flows.

use async_trait::async_trait;

use crate::error::HeraldError;

/// Source of secrets typed by the operator during login.
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// Reads the login code sent to `phone`.
    async fn login_code(&self, phone: &str) -> Result<String, HeraldError>;

    /// Reads the two-step verification password for `phone`.
    async fn password(&self, phone: &str) -> Result<String, HeraldError>;
}
