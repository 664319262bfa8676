#![forbid(unsafe_code)]

use super::catalog::tag_row;
use super::items::item_exists_tx;
use super::{
    AssociationRow, ItemTagRow, ItemTagsRequest, SqliteStore, StoreError, item_id_from_row,
    tag_id_from_row,
};
use rusqlite::{Connection, OptionalExtension, params};
use tv_core::{ItemId, TagId};

impl SqliteStore {
    pub fn association_get(
        &self,
        item_id: ItemId,
        tag_id: TagId,
    ) -> Result<Option<AssociationRow>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT item_id, tag_id, score, created_at_ms FROM associations \
                 WHERE item_id=?1 AND tag_id=?2",
                params![item_id.get(), tag_id.get()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((item_id, tag_id, score, created_at_ms)) => Ok(Some(AssociationRow {
                item_id: item_id_from_row(item_id)?,
                tag_id: tag_id_from_row(tag_id)?,
                score,
                created_at_ms,
            })),
            None => Ok(None),
        }
    }

    /// Visible tags of an item, best scored first.
    ///
    /// Associations at or below zero are waiting for a retried prune and are skipped.
    pub fn item_tags(&self, request: ItemTagsRequest) -> Result<Vec<ItemTagRow>, StoreError> {
        if !item_exists_tx(&self.conn, request.item_id)? {
            return Err(StoreError::UnknownItem);
        }
        let viewer = request.viewer.map(|user| user.get()).unwrap_or(0);

        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name, t.added_by, t.usage_count, t.created_at_ms, \
                    a.score, COALESCE(v.vote_value, 0) \
             FROM associations a \
             JOIN tags t ON t.id = a.tag_id \
             LEFT JOIN votes v ON v.item_id = a.item_id \
                              AND v.tag_id = a.tag_id \
                              AND v.user_id = ?2 \
             WHERE a.item_id = ?1 AND a.score > 0 \
             ORDER BY a.score DESC, t.name ASC",
        )?;

        let mut rows = stmt.query(params![request.item_id.get(), viewer])?;
        let mut out = Vec::new();

        while let Some(row) = rows.next()? {
            let tag = tag_row(
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            )?;
            out.push(ItemTagRow {
                tag,
                net_score: row.get::<_, i64>(5)?,
                user_vote: row.get::<_, i64>(6)?,
            });
        }

        Ok(out)
    }
}

/// Creates the (item, tag) association with score 0 if it is absent.
///
/// Returns whether a row was inserted; the tag's usage counter follows insertions only.
pub(super) fn association_ensure_tx(
    tx: &Connection,
    item_id: ItemId,
    tag_id: TagId,
    now_ms: i64,
) -> Result<bool, StoreError> {
    let inserted = tx.execute(
        "INSERT INTO associations(item_id, tag_id, score, created_at_ms) VALUES (?1, ?2, 0, ?3) \
         ON CONFLICT(item_id, tag_id) DO NOTHING",
        params![item_id.get(), tag_id.get(), now_ms],
    )?;

    if inserted == 1 {
        tx.execute(
            "UPDATE tags SET usage_count = usage_count + 1 WHERE id=?1",
            params![tag_id.get()],
        )?;
    }

    Ok(inserted == 1)
}

pub(super) fn association_exists_tx(
    tx: &Connection,
    item_id: ItemId,
    tag_id: TagId,
) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM associations WHERE item_id=?1 AND tag_id=?2",
            params![item_id.get(), tag_id.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}
