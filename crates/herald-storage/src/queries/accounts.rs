// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account CRUD operations.

use herald_core::{Account, HeraldError, NewAccount, SelfInfo};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

const ACCOUNT_COLUMNS: &str = "id, api_id, api_hash, phone, twofa, user_id, username, name";

fn row_to_account(row: &rusqlite::Row<'_>) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        api_id: row.get(1)?,
        api_hash: row.get(2)?,
        phone: row.get(3)?,
        twofa: row.get(4)?,
        user_id: row.get(5)?,
        username: row.get(6)?,
        name: row.get(7)?,
    })
}

/// List all accounts ordered by id.
pub async fn list_accounts(db: &Database) -> Result<Vec<Account>, HeraldError> {
    db.connection()
        .call(|conn| -> Result<Vec<Account>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"))?;
            let rows = stmt.query_map([], row_to_account)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Get an account by id.
pub async fn get_account(db: &Database, id: i64) -> Result<Option<Account>, HeraldError> {
    db.connection()
        .call(move |conn| -> Result<Option<Account>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
                params![id],
                row_to_account,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Get an account by its unique phone number.
pub async fn get_account_by_phone(
    db: &Database,
    phone: &str,
) -> Result<Option<Account>, HeraldError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Account>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE phone = ?1"),
                params![phone],
                row_to_account,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert the account, or update the existing row with the same phone.
///
/// Returns the id of the inserted or updated row.
pub async fn upsert_account(db: &Database, account: &NewAccount) -> Result<i64, HeraldError> {
    let account = account.clone();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "INSERT INTO accounts (api_id, api_hash, phone, twofa, user_id, username, name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(phone) DO UPDATE SET
                     api_id = excluded.api_id,
                     api_hash = excluded.api_hash,
                     twofa = excluded.twofa,
                     user_id = excluded.user_id,
                     username = excluded.username,
                     name = excluded.name
                 RETURNING id",
                params![
                    account.api_id,
                    account.api_hash,
                    account.phone,
                    account.twofa,
                    account.user_id,
                    account.username,
                    account.name,
                ],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Store the profile reported by the messaging service.
pub async fn update_profile(db: &Database, id: i64, info: &SelfInfo) -> Result<bool, HeraldError> {
    let info = info.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE accounts SET user_id = ?1, username = ?2, name = ?3 WHERE id = ?4",
                params![info.user_id, info.username, info.display_name, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the stored two-step verification password.
pub async fn update_twofa(db: &Database, id: i64, password: &str) -> Result<bool, HeraldError> {
    let password = password.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE accounts SET twofa = ?1 WHERE id = ?2",
                params![password, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete an account. Returns whether a row was removed.
pub async fn delete_account(db: &Database, id: i64) -> Result<bool, HeraldError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of stored accounts.
pub async fn count_accounts(db: &Database) -> Result<i64, HeraldError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(phone: &str) -> NewAccount {
        NewAccount {
            api_id: 111,
            api_hash: "hash".into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn upsert_inserts_then_updates_by_phone() {
        let db = Database::open_in_memory().await.unwrap();

        let id = upsert_account(&db, &new_account("+1")).await.unwrap();
        let mut changed = new_account("+1");
        changed.api_hash = "rotated".into();
        changed.twofa = Some("pw".into());
        let same_id = upsert_account(&db, &changed).await.unwrap();

        assert_eq!(id, same_id);
        assert_eq!(count_accounts(&db).await.unwrap(), 1);
        let stored = get_account(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.api_hash, "rotated");
        assert_eq!(stored.twofa.as_deref(), Some("pw"));
    }

    #[tokio::test]
    async fn profile_and_twofa_updates() {
        let db = Database::open_in_memory().await.unwrap();
        let id = upsert_account(&db, &new_account("+2")).await.unwrap();

        let info = SelfInfo {
            user_id: 42,
            username: Some("bob".into()),
            display_name: Some("Bob".into()),
        };
        assert!(update_profile(&db, id, &info).await.unwrap());
        assert!(update_twofa(&db, id, "secret").await.unwrap());

        let stored = get_account_by_phone(&db, "+2").await.unwrap().unwrap();
        assert_eq!(stored.user_id, Some(42));
        assert_eq!(stored.username.as_deref(), Some("bob"));
        assert_eq!(stored.name.as_deref(), Some("Bob"));
        assert_eq!(stored.twofa.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let db = Database::open_in_memory().await.unwrap();
        let id = upsert_account(&db, &new_account("+3")).await.unwrap();
        assert!(delete_account(&db, id).await.unwrap());
        assert!(!delete_account(&db, id).await.unwrap());
        assert!(list_accounts(&db).await.unwrap().is_empty());
    }
}
