// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account export/import against a real SQLite file.

use herald_core::{AccountStore, HeraldError, NewAccount};
use herald_storage::{Database, SqliteAccountStore, export_accounts, import_accounts};

async fn store_in(dir: &tempfile::TempDir) -> SqliteAccountStore {
    let db = Database::open(dir.path().join("accounts.db"), true)
        .await
        .unwrap();
    SqliteAccountStore::new(db)
}

fn account(phone: &str, api_id: i64) -> NewAccount {
    NewAccount {
        api_id,
        api_hash: format!("hash-{api_id}"),
        phone: phone.into(),
        twofa: Some("pw".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn export_then_import_into_fresh_database() {
    let dir = tempfile::tempdir().unwrap();
    let source = store_in(&dir).await;
    source.upsert_account(&account("+100", 1)).await.unwrap();
    source.upsert_account(&account("+200", 2)).await.unwrap();

    let file = dir.path().join("accounts_export.json");
    let export = export_accounts(&source, &file).await.unwrap();
    assert_eq!(export.exported, 2);
    assert!(export.verified);

    let other = tempfile::tempdir().unwrap();
    let target = store_in(&other).await;
    let summary = import_accounts(&target, &file, None).await.unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.added(), 2);

    let imported = target.get_account_by_phone("+200").await.unwrap().unwrap();
    assert_eq!(imported.api_hash, "hash-2");
    assert_eq!(imported.twofa.as_deref(), Some("pw"));
}

#[tokio::test]
async fn export_with_no_accounts_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).await;
    let err = export_accounts(&store, &dir.path().join("out.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, HeraldError::Validation(_)));
}

#[tokio::test]
async fn import_skips_duplicates_and_applies_default_twofa() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).await;
    store.upsert_account(&account("+100", 1)).await.unwrap();

    let file = dir.path().join("in.json");
    std::fs::write(
        &file,
        r#"[
            {"api_id": 1, "api_hash": "new", "phone": "+100"},
            {"api_id": "3", "api_hash": "h3", "phone": "+300"},
            {"api_id": 4, "api_hash": "h4", "phone": "+300"},
            {"api_id": 5, "api_hash": "h5", "phone": ""},
            {"api_hash": "no id", "phone": "+600"}
        ]"#,
    )
    .unwrap();

    let summary = import_accounts(&store, &file, Some("default-pw"))
        .await
        .unwrap();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.added(), 1);

    let updated = store.get_account_by_phone("+100").await.unwrap().unwrap();
    assert_eq!(updated.api_hash, "new");
    assert_eq!(updated.twofa.as_deref(), Some("default-pw"));
    let added = store.get_account_by_phone("+300").await.unwrap().unwrap();
    assert_eq!(added.api_id, 3);
}

#[tokio::test]
async fn import_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).await;
    let err = import_accounts(&store, &dir.path().join("missing.json"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, HeraldError::NotFound { .. }));
}
