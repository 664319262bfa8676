#![forbid(unsafe_code)]

use super::{
    MAX_TAG_LIST_LIMIT, SqliteStore, StoreError, TagListRequest, TagRow, tag_id_from_row,
    to_sqlite_i64, user_id_from_row,
};
use rusqlite::{Connection, OptionalExtension, params};
use tv_core::{TagId, TagName, UserId};

impl SqliteStore {
    pub fn tag_get(&self, tag_id: TagId) -> Result<Option<TagRow>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, added_by, usage_count, created_at_ms FROM tags WHERE id=?1",
                params![tag_id.get()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, name, added_by, usage_count, created_at_ms)| {
            tag_row(id, name, added_by, usage_count, created_at_ms)
        })
        .transpose()
    }

    pub fn tag_find(&self, name: &str) -> Result<Option<TagRow>, StoreError> {
        let name =
            TagName::normalize(name).map_err(|err| StoreError::InvalidInput(err.message()))?;
        let id = self
            .conn
            .query_row(
                "SELECT id FROM tags WHERE name=?1",
                params![name.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        match id {
            Some(id) => self.tag_get(tag_id_from_row(id)?),
            None => Ok(None),
        }
    }

    /// Most used tags first, ties broken by name.
    pub fn tag_list(&self, request: TagListRequest) -> Result<Vec<TagRow>, StoreError> {
        let limit = to_sqlite_i64(request.limit.clamp(1, MAX_TAG_LIST_LIMIT))?;

        let mut stmt = self.conn.prepare(
            "SELECT id, name, added_by, usage_count, created_at_ms \
             FROM tags \
             ORDER BY usage_count DESC, name ASC \
             LIMIT ?1",
        )?;

        let mut rows = stmt.query(params![limit])?;
        let mut out = Vec::new();

        while let Some(row) = rows.next()? {
            out.push(tag_row(
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            )?);
        }

        Ok(out)
    }
}

/// Returns the id for `name`, inserting the tag when it does not exist yet.
///
/// A concurrent insert of the same name resolves to the row that won the unique index.
pub(super) fn tag_get_or_create_tx(
    tx: &Connection,
    name: &TagName,
    added_by: UserId,
    now_ms: i64,
) -> Result<(TagId, bool), StoreError> {
    let inserted = tx.execute(
        "INSERT INTO tags(name, added_by, usage_count, created_at_ms) VALUES (?1, ?2, 0, ?3) \
         ON CONFLICT(name) DO NOTHING",
        params![name.as_str(), added_by.get(), now_ms],
    )?;

    let id = tx
        .query_row(
            "SELECT id FROM tags WHERE name=?1",
            params![name.as_str()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .ok_or(StoreError::ConsistencyViolation {
            detail: "tag missing right after get-or-create",
        })?;

    Ok((tag_id_from_row(id)?, inserted == 1))
}

/// Deletes the tag unless some association still references it.
///
/// The reference check and the delete are one statement, so they see the same snapshot
/// as the enclosing prune.
pub(super) fn tag_delete_if_orphan_tx(
    tx: &Connection,
    tag_id: TagId,
) -> Result<bool, StoreError> {
    let deleted = tx.execute(
        "DELETE FROM tags WHERE id=?1 \
         AND NOT EXISTS (SELECT 1 FROM associations WHERE tag_id=?1)",
        params![tag_id.get()],
    )?;
    Ok(deleted == 1)
}

pub(super) fn tag_row(
    id: i64,
    name: String,
    added_by: Option<i64>,
    usage_count: i64,
    created_at_ms: i64,
) -> Result<TagRow, StoreError> {
    Ok(TagRow {
        id: tag_id_from_row(id)?,
        name,
        added_by: added_by.map(user_id_from_row).transpose()?,
        usage_count,
        created_at_ms,
    })
}
