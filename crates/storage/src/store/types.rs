#![forbid(unsafe_code)]

use tv_core::{ItemId, TagId, TagName, UserId, VoteChoice};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagRow {
    pub id: TagId,
    pub name: String,
    pub added_by: Option<UserId>,
    pub usage_count: i64,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssociationRow {
    pub item_id: ItemId,
    pub tag_id: TagId,
    pub score: i64,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteRow {
    pub item_id: ItemId,
    pub tag_id: TagId,
    pub user_id: UserId,
    pub vote_value: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// A tag as displayed on one item, with the viewer's own vote (0 when none).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemTagRow {
    pub tag: TagRow,
    pub net_score: i64,
    pub user_vote: i64,
}

/// What a ledger write did to the caller's row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerChange {
    /// No prior row; a new one was inserted.
    Cast,
    /// A prior row was overwritten (possibly with the same value).
    Changed { previous: i64 },
    /// The caller's row was deleted.
    Retracted { previous: i64 },
    /// Retraction requested but the caller had no row.
    NothingToRetract,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PruneOutcome {
    pub votes_deleted: usize,
    pub tag_deleted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagAddResult {
    pub tag_id: TagId,
    pub tag_name: TagName,
    pub vote_value: i64,
    pub score: i64,
    pub tag_created: bool,
    pub association_created: bool,
    pub ledger: LedgerChange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagVoteResult {
    pub choice: VoteChoice,
    pub ledger: LedgerChange,
    /// Score as recomputed from the ledger; may be zero or negative.
    pub score: i64,
    /// Score as reported to callers: zero once the association is at or below zero.
    pub net_score: i64,
    pub removed: bool,
    pub prune: Option<PruneOutcome>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRemoveResult {
    pub associations_removed: usize,
    pub tags_deleted: usize,
}
