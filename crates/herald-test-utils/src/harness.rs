// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for integration tests.
//!
//! `TestHarness` assembles a temp directory holding a rule file, a SQLite
//! account database, and a task file, plus a [`MockClientFactory`] with one
//! mock client per seeded account.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use herald_config::HeraldConfig;
use herald_core::{Account, AccountStore, HeraldError, NewAccount};
use herald_rules::{RuleStore, SharedRuleStore};
use herald_storage::{Database, SqliteAccountStore};

use crate::mock_client::{MockClient, MockClientFactory};

struct SeedRule {
    keyword: String,
    responses: Vec<String>,
    private_only: bool,
}

/// Builder for creating test environments.
#[derive(Default)]
pub struct TestHarnessBuilder {
    rules: Vec<SeedRule>,
    accounts: Vec<String>,
}

impl TestHarnessBuilder {
    /// Adds a rule; extra responses become alternatives.
    pub fn with_rule(mut self, keyword: &str, responses: &[&str], private_only: bool) -> Self {
        self.rules.push(SeedRule {
            keyword: keyword.to_string(),
            responses: responses.iter().map(|r| r.to_string()).collect(),
            private_only,
        });
        self
    }

    /// Adds an authorized account with this phone.
    pub fn with_account(mut self, phone: &str) -> Self {
        self.accounts.push(phone.to_string());
        self
    }

    pub async fn build(self) -> Result<TestHarness, HeraldError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| HeraldError::Storage {
            source: e.into(),
        })?;
        let root = temp_dir.path().to_path_buf();

        let mut config = HeraldConfig::default();
        config.rules.rules_file = path_string(root.join("responder_rules.json"));
        config.rules.export_file = path_string(root.join("responder_rules_export.json"));
        config.storage.database_path = path_string(root.join("accounts").join("accounts.db"));
        config.accounts.export_file = path_string(root.join("accounts_export.json"));
        config.tasks.tasks_file = path_string(root.join("tasks_data.json"));

        let mut store = RuleStore::open(&config.rules.rules_file, &config.rules.default_response);
        for seed in self.rules {
            let mut responses = seed.responses.into_iter();
            let first = responses.next().unwrap_or_default();
            let message = store.add(&seed.keyword, &first, seed.private_only)?;
            let id = message
                .split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .to_string();
            for response in responses {
                store.update(&id, None, Some(&response), None)?;
            }
        }

        let db = Database::open(&config.storage.database_path, config.storage.wal_mode).await?;
        let accounts = Arc::new(SqliteAccountStore::new(db));
        let factory = Arc::new(MockClientFactory::new());
        for (n, phone) in self.accounts.iter().enumerate() {
            let api_id = n as i64 + 1;
            accounts
                .upsert_account(&NewAccount {
                    api_id,
                    api_hash: format!("hash{api_id}"),
                    phone: phone.clone(),
                    ..Default::default()
                })
                .await?;
            factory.register(Arc::new(MockClient::new(phone.clone()))).await;
        }

        Ok(TestHarness {
            temp_dir,
            config,
            rules: Arc::new(RwLock::new(store)),
            accounts,
            factory,
        })
    }
}

/// A temp-dir backed environment with mock messaging clients.
pub struct TestHarness {
    temp_dir: tempfile::TempDir,
    pub config: HeraldConfig,
    pub rules: SharedRuleStore,
    pub accounts: Arc<SqliteAccountStore>,
    pub factory: Arc<MockClientFactory>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }

    /// Root of the temp directory; removed when the harness drops.
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// The stored record for `phone`.
    pub async fn account(&self, phone: &str) -> Result<Account, HeraldError> {
        self.accounts
            .get_account_by_phone(phone)
            .await?
            .ok_or_else(|| HeraldError::not_found("account", phone))
    }

    /// The mock client handed out for `phone`.
    pub async fn client(&self, phone: &str) -> Result<Arc<MockClient>, HeraldError> {
        self.factory
            .client(phone)
            .await
            .ok_or_else(|| HeraldError::not_found("client", phone))
    }
}

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_rules_and_accounts() {
        let harness = TestHarness::builder()
            .with_rule("hi", &["hello", "hey"], false)
            .with_rule("price", &["DM me"], true)
            .with_account("+100")
            .with_account("+200")
            .build()
            .await
            .unwrap();

        let rules = harness.rules.read().await;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.get("1").unwrap().responses, vec!["hello", "hey"]);
        assert!(rules.get("2").unwrap().private_only);
        drop(rules);

        assert_eq!(harness.accounts.count_accounts().await.unwrap(), 2);
        assert_eq!(harness.account("+200").await.unwrap().api_id, 2);
        assert!(harness.client("+100").await.is_ok());
    }
}
