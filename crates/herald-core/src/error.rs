// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Herald crate.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across Herald's stores, runtime, and clients.
///
/// Operations that report a status message to the operator return
/// `Result<String, HeraldError>`: the `Ok` value is the success message and
/// the `Display` rendering of the error is the failure reason.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Configuration errors (invalid TOML, unknown keys, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller supplied an invalid argument (empty keyword, index out of range).
    #[error("{0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// Reading or writing a persisted JSON document failed.
    #[error("{message}: {source}")]
    Persistence {
        message: String,
        source: BoxedSource,
    },

    /// Account database errors (connection, query, migration).
    #[error("storage error: {source}")]
    Storage { source: BoxedSource },

    /// Messaging client could not be constructed or connected.
    #[error("client error: {message}")]
    Client {
        message: String,
        source: Option<BoxedSource>,
    },

    /// Login code, password, or session rejected by the messaging service.
    #[error("authorization failed: {message}")]
    Authorization {
        message: String,
        source: Option<BoxedSource>,
    },

    /// Reply or typing indicator could not be delivered.
    #[error("delivery failed: {message}")]
    Delivery {
        message: String,
        source: Option<BoxedSource>,
    },

    /// The account already has a running responder session.
    #[error("account {0} is already active")]
    AlreadyActive(String),

    /// Operation aborted by a cancellation signal.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HeraldError {
    /// Builds a [`HeraldError::Persistence`] from any error source.
    pub fn persistence(
        message: impl Into<String>,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Self::Persistence {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Builds a [`HeraldError::NotFound`].
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Builds a [`HeraldError::Delivery`] without an underlying source.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a [`HeraldError::Authorization`] without an underlying source.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
            source: None,
        }
    }
}
