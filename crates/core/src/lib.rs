#![forbid(unsafe_code)]

pub mod ids;
pub mod scoring;
pub mod tags;
pub mod votes;

pub use ids::{IdError, ItemId, TagId, UserId};
pub use scoring::{Ballot, RawSum, ScoreRule};
pub use tags::{MAX_TAG_NAME_CHARS, TagName, TagNameError};
pub use votes::{VoteChoice, VoteChoiceError};
