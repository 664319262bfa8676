#![forbid(unsafe_code)]

use super::{
    LedgerChange, SqliteStore, StoreError, VoteRow, item_id_from_row, tag_id_from_row,
    user_id_from_row,
};
use rusqlite::{Connection, OptionalExtension, params};
use tv_core::{ItemId, TagId, UserId, VoteChoice};

impl SqliteStore {
    pub fn vote_get(
        &self,
        item_id: ItemId,
        tag_id: TagId,
        user_id: UserId,
    ) -> Result<Option<VoteRow>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT item_id, tag_id, user_id, vote_value, created_at_ms, updated_at_ms \
                 FROM votes WHERE item_id=?1 AND tag_id=?2 AND user_id=?3",
                params![item_id.get(), tag_id.get(), user_id.get()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((item_id, tag_id, user_id, vote_value, created_at_ms, updated_at_ms)) => {
                Ok(Some(VoteRow {
                    item_id: item_id_from_row(item_id)?,
                    tag_id: tag_id_from_row(tag_id)?,
                    user_id: user_id_from_row(user_id)?,
                    vote_value,
                    created_at_ms,
                    updated_at_ms,
                }))
            }
            None => Ok(None),
        }
    }

    pub fn vote_count(&self, item_id: ItemId, tag_id: TagId) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(1) FROM votes WHERE item_id=?1 AND tag_id=?2",
            params![item_id.get(), tag_id.get()],
            |row| row.get::<_, i64>(0),
        )?)
    }
}

/// Applies `choice` to the caller's ledger row.
///
/// Upvote/Downvote overwrite the single (item, tag, user) row; Retract deletes it, so a
/// later cast starts over as a first-time vote.
pub(super) fn vote_upsert_tx(
    tx: &Connection,
    item_id: ItemId,
    tag_id: TagId,
    user_id: UserId,
    choice: VoteChoice,
    now_ms: i64,
) -> Result<LedgerChange, StoreError> {
    let previous = tx
        .query_row(
            "SELECT vote_value FROM votes WHERE item_id=?1 AND tag_id=?2 AND user_id=?3",
            params![item_id.get(), tag_id.get(), user_id.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    let Some(value) = choice.ledger_value() else {
        let Some(previous) = previous else {
            return Ok(LedgerChange::NothingToRetract);
        };
        tx.execute(
            "DELETE FROM votes WHERE item_id=?1 AND tag_id=?2 AND user_id=?3",
            params![item_id.get(), tag_id.get(), user_id.get()],
        )?;
        return Ok(LedgerChange::Retracted { previous });
    };

    tx.execute(
        r#"
        INSERT INTO votes(item_id, tag_id, user_id, vote_value, created_at_ms, updated_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        ON CONFLICT(item_id, tag_id, user_id)
        DO UPDATE SET vote_value=excluded.vote_value, updated_at_ms=excluded.updated_at_ms
        "#,
        params![item_id.get(), tag_id.get(), user_id.get(), value, now_ms],
    )?;

    Ok(match previous {
        Some(previous) => LedgerChange::Changed { previous },
        None => LedgerChange::Cast,
    })
}
