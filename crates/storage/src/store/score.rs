#![forbid(unsafe_code)]

use super::associations::association_exists_tx;
use super::{SqliteStore, StoreError, user_id_from_row};
use rusqlite::{Connection, params};
use tv_core::{Ballot, ItemId, ScoreRule, TagId};

impl SqliteStore {
    /// Recomputes and stores the score of one association in its own transaction.
    pub fn score_recompute(&mut self, item_id: ItemId, tag_id: TagId) -> Result<i64, StoreError> {
        let rule = self.score_rule.clone();
        let tx = self.write_tx()?;
        if !association_exists_tx(&tx, item_id, tag_id)? {
            return Err(StoreError::UnknownAssociation);
        }
        let score = score_recompute_tx(&tx, rule.as_ref(), item_id, tag_id)?;
        tx.commit()?;
        Ok(score)
    }
}

pub(super) fn ballots_tx(
    tx: &Connection,
    item_id: ItemId,
    tag_id: TagId,
) -> Result<Vec<Ballot>, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT user_id, vote_value, created_at_ms, updated_at_ms \
         FROM votes WHERE item_id=?1 AND tag_id=?2 \
         ORDER BY user_id ASC",
    )?;
    let mut rows = stmt.query(params![item_id.get(), tag_id.get()])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(Ballot {
            user_id: user_id_from_row(row.get::<_, i64>(0)?)?,
            value: row.get::<_, i64>(1)?,
            created_at_ms: row.get::<_, i64>(2)?,
            updated_at_ms: row.get::<_, i64>(3)?,
        });
    }
    Ok(out)
}

/// Folds the current ledger rows of the pair into a score and writes it back.
///
/// Reads and writes go through the caller's transaction, so the ledger write that
/// triggered the recompute is always visible here.
pub(super) fn score_recompute_tx(
    tx: &Connection,
    rule: &dyn ScoreRule,
    item_id: ItemId,
    tag_id: TagId,
) -> Result<i64, StoreError> {
    let ballots = ballots_tx(tx, item_id, tag_id)?;
    let score = rule.score(&ballots);

    let updated = tx.execute(
        "UPDATE associations SET score=?3 WHERE item_id=?1 AND tag_id=?2",
        params![item_id.get(), tag_id.get(), score],
    )?;
    if updated != 1 {
        return Err(StoreError::ConsistencyViolation {
            detail: "association vanished before its score was written",
        });
    }

    Ok(score)
}
