// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account record store trait.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{Account, NewAccount, SelfInfo};

/// Persistent store of registered accounts, keyed uniquely by phone.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Lists every account ordered by id.
    async fn list_accounts(&self) -> Result<Vec<Account>, HeraldError>;

    async fn get_account(&self, id: i64) -> Result<Option<Account>, HeraldError>;

    async fn get_account_by_phone(&self, phone: &str) -> Result<Option<Account>, HeraldError>;

    /// Inserts the account, or updates every other field of the existing
    /// row with the same phone. Returns the row id.
    async fn upsert_account(&self, account: &NewAccount) -> Result<i64, HeraldError>;

    /// Stores the profile reported by the messaging service.
    async fn update_profile(&self, id: i64, info: &SelfInfo) -> Result<(), HeraldError>;

    async fn update_twofa(&self, id: i64, password: &str) -> Result<(), HeraldError>;

    /// Deletes the account. Returns `false` when no row matched.
    async fn delete_account(&self, id: i64) -> Result<bool, HeraldError>;

    async fn count_accounts(&self) -> Result<i64, HeraldError>;
}
