#![forbid(unsafe_code)]

use tv_core::{ItemId, TagId, UserId, VoteChoice};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagAddRequest {
    pub item_id: ItemId,
    pub tag_name: String,
    pub user_id: UserId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagVoteRequest {
    pub item_id: ItemId,
    pub tag_id: TagId,
    pub user_id: UserId,
    pub choice: VoteChoice,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagListRequest {
    pub limit: usize,
}

impl Default for TagListRequest {
    fn default() -> Self {
        Self {
            limit: super::DEFAULT_TAG_LIST_LIMIT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemTagsRequest {
    pub item_id: ItemId,
    pub viewer: Option<UserId>,
}
