#![forbid(unsafe_code)]

use super::{StoreError, now_ms};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;

const SCHEMA_VERSION: i64 = 2;

const REQUIRED_TABLES: [&str; 5] = ["store_state", "items", "tags", "associations", "votes"];

pub(super) fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    if tables.is_empty() {
        return Ok(());
    }

    let required: BTreeSet<&str> = REQUIRED_TABLES.into_iter().collect();

    if tables
        .iter()
        .any(|table| !required.contains(table.as_str()))
    {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: unsupported tables detected",
        ));
    }

    for table in required {
        if !tables.contains(table) {
            return Err(StoreError::InvalidInput(
                "RESET_REQUIRED: required table is missing",
            ));
        }
    }

    let version = conn
        .query_row(
            "SELECT schema_version FROM store_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match version {
        Some(v) if v == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        )),
        None => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema state row is missing",
        )),
    }
}

pub(super) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    let now_ms = now_ms();

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store_state (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS items (
          id INTEGER PRIMARY KEY CHECK(id > 0),
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tags (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL UNIQUE,
          added_by INTEGER,
          usage_count INTEGER NOT NULL DEFAULT 0 CHECK(usage_count >= 0),
          created_at_ms INTEGER NOT NULL,
          CHECK(length(trim(name)) > 0)
        );

        CREATE TABLE IF NOT EXISTS associations (
          item_id INTEGER NOT NULL,
          tag_id INTEGER NOT NULL,
          score INTEGER NOT NULL DEFAULT 0,
          created_at_ms INTEGER NOT NULL,
          PRIMARY KEY(item_id, tag_id),
          FOREIGN KEY(item_id) REFERENCES items(id) ON DELETE RESTRICT,
          FOREIGN KEY(tag_id) REFERENCES tags(id) ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_associations_tag
          ON associations(tag_id, item_id);

        CREATE TABLE IF NOT EXISTS votes (
          item_id INTEGER NOT NULL,
          tag_id INTEGER NOT NULL,
          user_id INTEGER NOT NULL CHECK(user_id > 0),
          vote_value INTEGER NOT NULL CHECK(vote_value IN (-1, 1)),
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          UNIQUE(item_id, tag_id, user_id),
          FOREIGN KEY(item_id, tag_id)
            REFERENCES associations(item_id, tag_id)
            ON DELETE CASCADE
        );
        "#,
    )?;

    conn.execute(
        "INSERT INTO store_state(singleton, schema_version, created_at_ms, updated_at_ms) \
         VALUES (1, ?1, ?2, ?2) \
         ON CONFLICT(singleton) DO UPDATE SET schema_version=excluded.schema_version, updated_at_ms=excluded.updated_at_ms",
        params![SCHEMA_VERSION, now_ms],
    )?;

    Ok(())
}
