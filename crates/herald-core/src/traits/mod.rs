// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits implemented by the messaging, storage, and
//! operator-facing crates.

pub mod client;
pub mod prompt;
pub mod storage;

pub use client::{ClientFactory, MessagingClient};
pub use prompt::CredentialPrompt;
pub use storage::AccountStore;
