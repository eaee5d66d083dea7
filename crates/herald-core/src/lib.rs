// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Herald auto-responder.
//!
//! This crate provides the error type, the shared account and message types,
//! and the collaborator traits the other crates implement: messaging clients
//! the account record store, and the operator credential prompt.

pub mod error;
pub mod persist;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HeraldError;
pub use types::{
    Account, AccountCredentials, ConnectionReport, ConnectionStatus, ConversationId,
    InboundEvent, NewAccount, SelfInfo, SignInOutcome,
};

pub use traits::{AccountStore, ClientFactory, CredentialPrompt, MessagingClient};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn _assert_client(_: &dyn MessagingClient) {}
        fn _assert_factory(_: &dyn ClientFactory) {}
        fn _assert_store(_: &dyn AccountStore) {}
        fn _assert_prompt(_: &dyn CredentialPrompt) {}
    }
}
