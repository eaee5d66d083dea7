// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the stores, the responder runtime, and clients.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the conversation (chat) an inbound message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered messaging account as stored in the account database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub api_id: i64,
    pub api_hash: String,
    pub phone: String,
    pub twofa: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub name: Option<String>,
}

impl Account {
    /// Credentials needed to build a messaging client for this account.
    pub fn credentials(&self) -> AccountCredentials {
        AccountCredentials {
            api_id: self.api_id,
            api_hash: self.api_hash.clone(),
            phone: self.phone.clone(),
        }
    }

    /// Human label used in menus and logs.
    pub fn label(&self) -> String {
        match (&self.name, &self.username) {
            (Some(name), Some(username)) => format!("{} ({name}, @{username})", self.phone),
            (Some(name), None) => format!("{} ({name})", self.phone),
            (None, Some(username)) => format!("{} (@{username})", self.phone),
            (None, None) => self.phone.clone(),
        }
    }
}

/// Fields for inserting or updating an account, keyed by phone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub api_id: i64,
    pub api_hash: String,
    pub phone: String,
    pub twofa: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub name: Option<String>,
}

/// Credentials handed to a [`ClientFactory`](crate::traits::ClientFactory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub api_id: i64,
    pub api_hash: String,
    pub phone: String,
}

/// Profile of the logged-in user, as reported by the messaging service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfInfo {
    pub user_id: i64,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

/// A new message observed on an account's subscription.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Service-assigned message id, used to reply to the exact message.
    pub message_id: i64,
    pub conversation: ConversationId,
    pub sender_id: Option<i64>,
    /// Message text; `None` for media or service messages.
    pub text: Option<String>,
    /// True when the message arrived in a one-to-one conversation.
    pub is_private: bool,
    pub received_at: DateTime<Utc>,
}

/// Result of submitting a login code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    Authorized,
    /// The account has a two-step verification password.
    PasswordRequired,
}

/// Outcome of a connection test for a single account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Authorized,
    Unauthorized,
    Error(String),
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorized => f.write_str("Authorized"),
            Self::Unauthorized => f.write_str("Unauthorized"),
            Self::Error(reason) => write!(f, "Error: {reason}"),
        }
    }
}

/// Connection test report for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionReport {
    pub account_id: i64,
    pub phone: String,
    pub status: ConnectionStatus,
}

impl ConnectionReport {
    pub fn is_ok(&self) -> bool {
        self.status == ConnectionStatus::Authorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: 1,
            api_id: 12345,
            api_hash: "abc".into(),
            phone: "+15550001".into(),
            twofa: None,
            user_id: None,
            username: None,
            name: None,
        }
    }

    #[test]
    fn label_falls_back_to_phone() {
        assert_eq!(account().label(), "+15550001");
    }

    #[test]
    fn label_includes_name_and_username() {
        let mut acc = account();
        acc.name = Some("Ada".into());
        acc.username = Some("ada".into());
        assert_eq!(acc.label(), "+15550001 (Ada, @ada)");
    }

    #[test]
    fn credentials_copy_identity_fields() {
        let creds = account().credentials();
        assert_eq!(creds.api_id, 12345);
        assert_eq!(creds.phone, "+15550001");
    }

    #[test]
    fn connection_status_display() {
        assert_eq!(ConnectionStatus::Authorized.to_string(), "Authorized");
        assert_eq!(
            ConnectionStatus::Error("timeout".into()).to_string(),
            "Error: timeout"
        );
    }
}
