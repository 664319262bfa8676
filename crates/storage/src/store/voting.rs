#![forbid(unsafe_code)]

use super::associations::{association_ensure_tx, association_exists_tx};
use super::catalog::tag_get_or_create_tx;
use super::items::item_exists_tx;
use super::ledger::vote_upsert_tx;
use super::prune::association_prune_tx;
use super::score::score_recompute_tx;
use super::{
    PruneOutcome, SqliteStore, StoreError, TagAddRequest, TagAddResult, TagVoteRequest,
    TagVoteResult, now_ms,
};
use rusqlite::Transaction;
use tv_core::{ItemId, TagId, TagName, VoteChoice};

impl SqliteStore {
    /// Attaches a tag to an item on behalf of a user.
    ///
    /// Get-or-create of the tag, creation of the association, the attacher's +1 and the
    /// score write commit together.
    pub fn tag_add(&mut self, request: TagAddRequest) -> Result<TagAddResult, StoreError> {
        let tag_name = TagName::normalize(&request.tag_name)
            .map_err(|err| StoreError::InvalidInput(err.message()))?;
        let rule = self.score_rule.clone();
        let now_ms = now_ms();

        let tx = self.write_tx()?;
        if !item_exists_tx(&tx, request.item_id)? {
            return Err(StoreError::UnknownItem);
        }

        let (tag_id, tag_created) = tag_get_or_create_tx(&tx, &tag_name, request.user_id, now_ms)?;
        let association_created = association_ensure_tx(&tx, request.item_id, tag_id, now_ms)?;
        let ledger = vote_upsert_tx(
            &tx,
            request.item_id,
            tag_id,
            request.user_id,
            VoteChoice::Upvote,
            now_ms,
        )?;
        let score = score_recompute_tx(&tx, rule.as_ref(), request.item_id, tag_id)?;

        tx.commit()?;

        tracing::debug!(
            item_id = request.item_id.get(),
            tag_id = tag_id.get(),
            user_id = request.user_id.get(),
            tag = tag_name.as_str(),
            tag_created,
            association_created,
            score,
            "tag attached"
        );

        Ok(TagAddResult {
            tag_id,
            tag_name,
            vote_value: VoteChoice::Upvote.wire_value(),
            score,
            tag_created,
            association_created,
            ledger,
        })
    }

    /// Records a user's vote on an attached tag and prunes the association at or below zero.
    ///
    /// A failed prune is logged and rolled back to its savepoint; the vote and score write
    /// still commit and the next vote on the pair retries the prune.
    pub fn tag_vote(&mut self, request: TagVoteRequest) -> Result<TagVoteResult, StoreError> {
        let rule = self.score_rule.clone();
        let now_ms = now_ms();

        let mut tx = self.write_tx()?;
        if !item_exists_tx(&tx, request.item_id)? {
            return Err(StoreError::UnknownItem);
        }
        if !association_exists_tx(&tx, request.item_id, request.tag_id)? {
            return Err(StoreError::UnknownAssociation);
        }

        let ledger = vote_upsert_tx(
            &tx,
            request.item_id,
            request.tag_id,
            request.user_id,
            request.choice,
            now_ms,
        )?;
        let score = score_recompute_tx(&tx, rule.as_ref(), request.item_id, request.tag_id)?;

        let prune = if score <= 0 {
            match prune_in_savepoint(&mut tx, request.item_id, request.tag_id) {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    if matches!(err, StoreError::ConsistencyViolation { .. }) {
                        tracing::error!(
                            item_id = request.item_id.get(),
                            tag_id = request.tag_id.get(),
                            error = %err,
                            "association prune hit a consistency violation"
                        );
                    } else {
                        tracing::warn!(
                            item_id = request.item_id.get(),
                            tag_id = request.tag_id.get(),
                            score,
                            error = %err,
                            "association prune failed; left for the next vote"
                        );
                    }
                    None
                }
            }
        } else {
            None
        };

        tx.commit()?;

        let removed = prune.is_some();
        tracing::debug!(
            item_id = request.item_id.get(),
            tag_id = request.tag_id.get(),
            user_id = request.user_id.get(),
            vote = request.choice.wire_value(),
            score,
            removed,
            tag_deleted = prune.is_some_and(|outcome| outcome.tag_deleted),
            "tag vote recorded"
        );

        Ok(TagVoteResult {
            choice: request.choice,
            ledger,
            score,
            net_score: score.max(0),
            removed,
            prune,
        })
    }
}

fn prune_in_savepoint(
    tx: &mut Transaction<'_>,
    item_id: ItemId,
    tag_id: TagId,
) -> Result<PruneOutcome, StoreError> {
    let sp = tx.savepoint()?;
    let outcome = association_prune_tx(&sp, item_id, tag_id)?;
    sp.commit()?;
    Ok(outcome)
}
