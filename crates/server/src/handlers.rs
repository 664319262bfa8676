#![forbid(unsafe_code)]

use crate::ApiError;
use crate::clock::ts_ms_to_rfc3339;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tv_core::{ItemId, TagId, UserId, VoteChoice};
use tv_storage::{
    DEFAULT_TAG_LIST_LIMIT, ItemTagsRequest, MAX_TAG_LIST_LIMIT, SqliteStore, TagAddRequest,
    TagListRequest, TagRow, TagVoteRequest,
};

/// Stand-in for the session collaborator: the authenticated caller, if any.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AuthParams {
    #[serde(default)]
    user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct TagAddParams {
    #[serde(default, alias = "package_id")]
    item_id: Option<i64>,
    #[serde(default)]
    tag_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TagVoteParams {
    #[serde(default, alias = "package_id")]
    item_id: Option<i64>,
    #[serde(default)]
    tag_id: Option<i64>,
    #[serde(default)]
    vote: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct TagListParams {
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemTagsParams {
    #[serde(default, alias = "package_id")]
    item_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct TagAddResponse {
    tag_id: i64,
    tag_name: String,
    vote_value: i64,
}

#[derive(Debug, Serialize)]
struct TagVoteResponse {
    vote: i64,
    vote_value: i64,
    net_score: i64,
    removed: bool,
}

#[derive(Debug, Serialize)]
struct TagView {
    id: i64,
    name: String,
    usage_count: i64,
    created_at: String,
}

impl From<TagRow> for TagView {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id.get(),
            name: row.name,
            usage_count: row.usage_count,
            created_at: ts_ms_to_rfc3339(row.created_at_ms),
        }
    }
}

#[derive(Debug, Serialize)]
struct ItemTagView {
    #[serde(flatten)]
    tag: TagView,
    net_score: i64,
    user_vote: i64,
}

#[derive(Debug, Serialize)]
struct TagsResponse<T> {
    tags: Vec<T>,
}

fn parse_params<T: for<'de> Deserialize<'de> + Default>(
    params: Option<&Value>,
) -> Result<T, ApiError> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|_| ApiError::bad_request("Invalid request body")),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    Ok(serde_json::to_value(value)?)
}

/// Resolves the caller; every write needs one.
pub(crate) fn current_user(params: Option<&Value>) -> Result<UserId, ApiError> {
    viewer(params)?.ok_or(ApiError::Unauthorized)
}

fn viewer(params: Option<&Value>) -> Result<Option<UserId>, ApiError> {
    let Some(auth) = params.and_then(|params| params.get("auth")) else {
        return Ok(None);
    };
    if auth.is_null() {
        return Ok(None);
    }
    let auth: AuthParams =
        serde_json::from_value(auth.clone()).map_err(|_| ApiError::Unauthorized)?;
    match auth.user_id {
        Some(raw) => UserId::try_new(raw)
            .map(Some)
            .map_err(|_| ApiError::Unauthorized),
        None => Ok(None),
    }
}

/// Ids of 0 or missing are the "required" failure; negative ids are malformed.
fn required_id<T>(
    raw: Option<i64>,
    make: impl Fn(i64) -> Result<T, tv_core::IdError>,
    missing: &'static str,
) -> Result<T, ApiError> {
    match raw {
        None | Some(0) => Err(ApiError::bad_request(missing)),
        Some(value) => make(value).map_err(|err| ApiError::bad_request(err.message())),
    }
}

pub(crate) fn tags_add(
    store: &mut SqliteStore,
    params: Option<&Value>,
) -> Result<Value, ApiError> {
    let user_id = current_user(params)?;
    let input: TagAddParams = parse_params(params)?;

    let tag_name = input.tag_name.unwrap_or_default();
    if input.item_id.unwrap_or(0) == 0 || tag_name.is_empty() {
        return Err(ApiError::bad_request("item_id and tag_name are required"));
    }
    let item_id = required_id(input.item_id, ItemId::try_new, "item_id is required")?;

    let added = store.tag_add(TagAddRequest {
        item_id,
        tag_name,
        user_id,
    })?;

    to_value(&TagAddResponse {
        tag_id: added.tag_id.get(),
        tag_name: added.tag_name.into_string(),
        vote_value: added.vote_value,
    })
}

pub(crate) fn tags_vote(
    store: &mut SqliteStore,
    params: Option<&Value>,
) -> Result<Value, ApiError> {
    let user_id = current_user(params)?;
    let input: TagVoteParams = parse_params(params)?;

    if input.item_id.unwrap_or(0) == 0 || input.tag_id.unwrap_or(0) == 0 {
        return Err(ApiError::bad_request("item_id and tag_id are required"));
    }
    let item_id = required_id(input.item_id, ItemId::try_new, "item_id is required")?;
    let tag_id = required_id(input.tag_id, TagId::try_new, "tag_id is required")?;
    let Some(vote) = input.vote else {
        return Err(ApiError::bad_request("vote is required"));
    };
    let choice =
        VoteChoice::from_wire(vote).map_err(|err| ApiError::bad_request(err.message()))?;

    let voted = store.tag_vote(TagVoteRequest {
        item_id,
        tag_id,
        user_id,
        choice,
    })?;

    to_value(&TagVoteResponse {
        vote,
        vote_value: voted.choice.wire_value(),
        net_score: voted.net_score,
        removed: voted.removed,
    })
}

pub(crate) fn tags_list(
    store: &SqliteStore,
    params: Option<&Value>,
) -> Result<Value, ApiError> {
    let input: TagListParams = parse_params(params)?;
    let limit = match input.limit {
        Some(limit) if limit > 0 && limit <= MAX_TAG_LIST_LIMIT as i64 => limit as usize,
        _ => DEFAULT_TAG_LIST_LIMIT,
    };

    let tags = store.tag_list(TagListRequest { limit })?;
    to_value(&TagsResponse {
        tags: tags.into_iter().map(TagView::from).collect(),
    })
}

pub(crate) fn items_tags(
    store: &SqliteStore,
    params: Option<&Value>,
) -> Result<Value, ApiError> {
    let viewer = viewer(params)?;
    let input: ItemTagsParams = parse_params(params)?;
    let item_id = required_id(input.item_id, ItemId::try_new, "item_id is required")?;

    let rows = store.item_tags(ItemTagsRequest { item_id, viewer })?;
    to_value(&TagsResponse {
        tags: rows
            .into_iter()
            .map(|row| ItemTagView {
                tag: TagView::from(row.tag),
                net_score: row.net_score,
                user_vote: row.user_vote,
            })
            .collect(),
    })
}
