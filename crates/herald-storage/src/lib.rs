// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Herald's registered accounts.
//!
//! Provides the account database (embedded migrations, legacy table upgrade,
//! single-writer access through `tokio-rusqlite`), the [`SqliteAccountStore`]
//! implementation of `AccountStore`, and JSON export/import of accounts.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;
pub mod transfer;

pub use adapter::SqliteAccountStore;
pub use database::Database;
pub use transfer::{ExportSummary, ImportSummary, export_accounts, import_accounts};
