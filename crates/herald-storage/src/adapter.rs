// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`AccountStore`] trait.

use async_trait::async_trait;
use tracing::debug;

use herald_config::StorageConfig;
use herald_core::{Account, AccountStore, HeraldError, NewAccount, SelfInfo};

use crate::database::Database;
use crate::queries::accounts;

/// SQLite-backed account store.
#[derive(Clone)]
pub struct SqliteAccountStore {
    db: Database,
}

impl SqliteAccountStore {
    /// Opens the database described by `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, HeraldError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        Ok(Self { db })
    }

    /// Wraps an already open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn list_accounts(&self) -> Result<Vec<Account>, HeraldError> {
        accounts::list_accounts(&self.db).await
    }

    async fn get_account(&self, id: i64) -> Result<Option<Account>, HeraldError> {
        accounts::get_account(&self.db, id).await
    }

    async fn get_account_by_phone(&self, phone: &str) -> Result<Option<Account>, HeraldError> {
        accounts::get_account_by_phone(&self.db, phone).await
    }

    async fn upsert_account(&self, account: &NewAccount) -> Result<i64, HeraldError> {
        let id = accounts::upsert_account(&self.db, account).await?;
        debug!(id, phone = %account.phone, "account saved");
        Ok(id)
    }

    async fn update_profile(&self, id: i64, info: &SelfInfo) -> Result<(), HeraldError> {
        if accounts::update_profile(&self.db, id, info).await? {
            Ok(())
        } else {
            Err(HeraldError::not_found("account", id))
        }
    }

    async fn update_twofa(&self, id: i64, password: &str) -> Result<(), HeraldError> {
        if accounts::update_twofa(&self.db, id, password).await? {
            Ok(())
        } else {
            Err(HeraldError::not_found("account", id))
        }
    }

    async fn delete_account(&self, id: i64) -> Result<bool, HeraldError> {
        accounts::delete_account(&self.db, id).await
    }

    async fn count_accounts(&self) -> Result<i64, HeraldError> {
        accounts::count_accounts(&self.db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_account_updates_are_not_found() {
        let store = SqliteAccountStore::new(Database::open_in_memory().await.unwrap());
        let err = store.update_twofa(99, "pw").await.unwrap_err();
        assert!(matches!(err, HeraldError::NotFound { .. }));
    }
}
