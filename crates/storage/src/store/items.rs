#![forbid(unsafe_code)]

use super::prune::association_prune_tx;
use super::{ItemRemoveResult, SqliteStore, StoreError, now_ms, tag_id_from_row};
use rusqlite::{Connection, OptionalExtension, params};
use tv_core::ItemId;

impl SqliteStore {
    /// Records that the catalog knows `item_id`. Idempotent.
    pub fn item_register(&mut self, item_id: ItemId) -> Result<bool, StoreError> {
        let inserted = self.conn.execute(
            "INSERT INTO items(id, created_at_ms) VALUES (?1, ?2) ON CONFLICT(id) DO NOTHING",
            params![item_id.get(), now_ms()],
        )?;
        Ok(inserted == 1)
    }

    pub fn item_exists(&self, item_id: ItemId) -> Result<bool, StoreError> {
        item_exists_tx(&self.conn, item_id)
    }

    /// Removes an item together with its associations, votes and any tag left orphaned.
    ///
    /// This is the only deletion path for a tagged item: the schema refuses a bare
    /// `DELETE FROM items` while associations still reference the row.
    pub fn item_remove(&mut self, item_id: ItemId) -> Result<ItemRemoveResult, StoreError> {
        let mut tx = self.write_tx()?;
        if !item_exists_tx(&tx, item_id)? {
            return Err(StoreError::UnknownItem);
        }

        let tag_ids = {
            let mut stmt =
                tx.prepare("SELECT tag_id FROM associations WHERE item_id=?1 ORDER BY tag_id")?;
            let mut rows = stmt.query(params![item_id.get()])?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                out.push(tag_id_from_row(row.get::<_, i64>(0)?)?);
            }
            out
        };

        let mut tags_deleted = 0usize;
        for tag_id in &tag_ids {
            let sp = tx.savepoint()?;
            let outcome = association_prune_tx(&sp, item_id, *tag_id)?;
            sp.commit()?;
            if outcome.tag_deleted {
                tags_deleted += 1;
            }
        }

        tx.execute("DELETE FROM items WHERE id=?1", params![item_id.get()])?;
        tx.commit()?;

        tracing::debug!(
            item_id = item_id.get(),
            associations_removed = tag_ids.len(),
            tags_deleted,
            "item removed"
        );
        Ok(ItemRemoveResult {
            associations_removed: tag_ids.len(),
            tags_deleted,
        })
    }
}

pub(super) fn item_exists_tx(tx: &Connection, item_id: ItemId) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM items WHERE id=?1",
            params![item_id.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}
