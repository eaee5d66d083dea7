// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account export and import as JSON documents.
//!
//! Exports are a JSON array of account records without the database id.
//! Imports also accept an object keyed by `api_id`, the shape produced by
//! older tooling.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use herald_core::persist::{read_json, write_json};
use herald_core::{Account, AccountStore, HeraldError, NewAccount};

/// One account as written to an export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(deserialize_with = "int_or_string")]
    pub api_id: i64,
    #[serde(default)]
    pub api_hash: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub twofa: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<Account> for AccountRecord {
    fn from(a: Account) -> Self {
        Self {
            api_id: a.api_id,
            api_hash: a.api_hash,
            phone: a.phone,
            twofa: a.twofa,
            user_id: a.user_id,
            username: a.username,
            name: a.name,
        }
    }
}

fn int_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Result of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    /// Whether re-reading the written file yielded the same number of records.
    pub verified: bool,
}

/// Result of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Entries found in the file.
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    /// Entries with an empty or repeated phone.
    pub skipped: usize,
    pub count_before: i64,
    pub count_after: i64,
}

impl ImportSummary {
    /// Accounts that did not exist before the import.
    pub fn added(&self) -> i64 {
        self.count_after - self.count_before
    }
}

/// Writes every stored account to `path`.
pub async fn export_accounts(
    store: &dyn AccountStore,
    path: &Path,
) -> Result<ExportSummary, HeraldError> {
    let accounts = store.list_accounts().await?;
    if accounts.is_empty() {
        return Err(HeraldError::Validation("No accounts to export".into()));
    }

    let records: Vec<AccountRecord> = accounts.into_iter().map(AccountRecord::from).collect();
    write_json(path, &records)?;

    let verified = match read_json::<Vec<serde_json::Value>>(path) {
        Ok(Some(back)) => back.len() == records.len(),
        Ok(None) => false,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "could not verify account export");
            false
        }
    };
    info!(count = records.len(), path = %path.display(), verified, "accounts exported");

    Ok(ExportSummary {
        exported: records.len(),
        verified,
    })
}

/// Upserts every account in the file at `path`.
///
/// Entries without `twofa` get `default_twofa`. Entries that fail to decode
/// or to store are counted as failed; the rest of the file still imports.
pub async fn import_accounts(
    store: &dyn AccountStore,
    path: &Path,
    default_twofa: Option<&str>,
) -> Result<ImportSummary, HeraldError> {
    let document: serde_json::Value = read_json(path)?
        .ok_or_else(|| HeraldError::not_found("file", path.display()))?;
    let entries = flatten_document(document)?;
    if entries.is_empty() {
        return Err(HeraldError::Validation("No accounts to import".into()));
    }

    let mut summary = ImportSummary {
        total: entries.len(),
        count_before: store.count_accounts().await?,
        ..Default::default()
    };
    let mut seen = HashSet::new();

    for entry in entries {
        let record: AccountRecord = match serde_json::from_value(entry) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping undecodable account entry");
                summary.failed += 1;
                continue;
            }
        };

        if record.phone.trim().is_empty() || !seen.insert(record.phone.clone()) {
            warn!(phone = %record.phone, "skipping account with empty or duplicate phone");
            summary.skipped += 1;
            continue;
        }

        let account = NewAccount {
            api_id: record.api_id,
            api_hash: record.api_hash,
            twofa: record.twofa.or_else(|| default_twofa.map(str::to_string)),
            user_id: record.user_id,
            username: record.username,
            name: record.name,
            phone: record.phone,
        };
        match store.upsert_account(&account).await {
            Ok(_) => summary.imported += 1,
            Err(e) => {
                warn!(phone = %account.phone, error = %e, "failed to import account");
                summary.failed += 1;
            }
        }
    }

    summary.count_after = store.count_accounts().await?;
    info!(
        total = summary.total,
        imported = summary.imported,
        failed = summary.failed,
        skipped = summary.skipped,
        added = summary.added(),
        "accounts imported"
    );
    Ok(summary)
}

fn flatten_document(document: serde_json::Value) -> Result<Vec<serde_json::Value>, HeraldError> {
    match document {
        serde_json::Value::Array(entries) => Ok(entries),
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(api_id, mut entry)| {
                if let Some(obj) = entry.as_object_mut() {
                    obj.insert("api_id".into(), serde_json::Value::String(api_id));
                }
                entry
            })
            .collect()),
        _ => Err(HeraldError::Validation(
            "account file must hold a JSON array or object".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_id_accepts_strings() {
        let record: AccountRecord =
            serde_json::from_str(r#"{"api_id": " 123 ", "phone": "+1"}"#).unwrap();
        assert_eq!(record.api_id, 123);
        assert_eq!(record.api_hash, "");
    }

    #[test]
    fn object_documents_are_keyed_by_api_id() {
        let doc = serde_json::json!({"777": {"api_hash": "h", "phone": "+7"}});
        let entries = flatten_document(doc).unwrap();
        let record: AccountRecord = serde_json::from_value(entries[0].clone()).unwrap();
        assert_eq!(record.api_id, 777);
        assert_eq!(record.phone, "+7");
    }

    #[test]
    fn scalar_documents_are_rejected() {
        assert!(flatten_document(serde_json::json!(3)).is_err());
    }
}
