#![forbid(unsafe_code)]

use super::catalog::tag_delete_if_orphan_tx;
use super::{PruneOutcome, StoreError};
use rusqlite::{Connection, params};
use tv_core::{ItemId, TagId};

/// Removes the association, its remaining votes, and the tag if nothing else references it.
///
/// Callers run this inside a savepoint so that every step lands or none does.
pub(super) fn association_prune_tx(
    tx: &Connection,
    item_id: ItemId,
    tag_id: TagId,
) -> Result<PruneOutcome, StoreError> {
    let votes_deleted = tx.execute(
        "DELETE FROM votes WHERE item_id=?1 AND tag_id=?2",
        params![item_id.get(), tag_id.get()],
    )?;

    let removed = tx.execute(
        "DELETE FROM associations WHERE item_id=?1 AND tag_id=?2",
        params![item_id.get(), tag_id.get()],
    )?;
    if removed != 1 {
        return Err(StoreError::ConsistencyViolation {
            detail: "association missing during prune",
        });
    }

    tx.execute(
        "UPDATE tags SET usage_count = MAX(usage_count - 1, 0) WHERE id=?1",
        params![tag_id.get()],
    )?;

    let tag_deleted = tag_delete_if_orphan_tx(tx, tag_id)?;

    Ok(PruneOutcome {
        votes_deleted,
        tag_deleted,
    })
}
