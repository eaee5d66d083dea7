// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations and the legacy table upgrade.

use herald_core::HeraldError;
use tracing::info;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Runs all pending refinery migrations.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), HeraldError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| HeraldError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}

/// Upgrades an `accounts` table created without the surrogate `id` column.
///
/// Older databases keyed accounts by phone only. The rows are copied into the
/// current schema and the old table is dropped, inside one transaction.
pub fn upgrade_legacy_schema(conn: &mut rusqlite::Connection) -> Result<bool, rusqlite::Error> {
    let columns = table_columns(conn, "accounts")?;
    if columns.is_empty() || columns.iter().any(|c| c == "id") {
        return Ok(false);
    }

    let tx = conn.transaction()?;
    tx.execute_batch(
        "ALTER TABLE accounts RENAME TO accounts_legacy;
         CREATE TABLE accounts (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             api_id INTEGER NOT NULL,
             api_hash TEXT NOT NULL,
             phone TEXT NOT NULL UNIQUE,
             twofa TEXT,
             user_id INTEGER,
             username TEXT,
             name TEXT
         );",
    )?;

    // Optional columns may be missing from very old tables.
    let select = |col: &str| {
        if columns.iter().any(|c| c == col) {
            col.to_string()
        } else {
            format!("NULL AS {col}")
        }
    };
    let copied = tx.execute(
        &format!(
            "INSERT OR IGNORE INTO accounts (api_id, api_hash, phone, twofa, user_id, username, name)
             SELECT api_id, api_hash, phone, {}, {}, {}, {} FROM accounts_legacy",
            select("twofa"),
            select("user_id"),
            select("username"),
            select("name"),
        ),
        [],
    )?;
    tx.execute_batch("DROP TABLE accounts_legacy;")?;
    tx.commit()?;

    info!(accounts = copied, "upgraded legacy accounts table");
    Ok(true)
}

fn table_columns(conn: &rusqlite::Connection, table: &str) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_needs_no_upgrade() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        assert!(!upgrade_legacy_schema(&mut conn).unwrap());
        run_migrations(&mut conn).unwrap();
        assert!(table_columns(&conn, "accounts").unwrap().contains(&"id".to_string()));
    }

    #[test]
    fn legacy_rows_are_preserved() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE accounts (api_id INTEGER, api_hash TEXT, phone TEXT PRIMARY KEY, twofa TEXT);
             INSERT INTO accounts VALUES (1, 'h1', '+100', 'pw');
             INSERT INTO accounts VALUES (2, 'h2', '+200', NULL);",
        )
        .unwrap();

        assert!(upgrade_legacy_schema(&mut conn).unwrap());
        run_migrations(&mut conn).unwrap();

        let phones: Vec<(i64, String)> = conn
            .prepare("SELECT id, phone FROM accounts ORDER BY id")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(phones, vec![(1, "+100".to_string()), (2, "+200".to_string())]);
    }
}
