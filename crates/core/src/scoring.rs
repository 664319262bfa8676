#![forbid(unsafe_code)]

use crate::ids::UserId;

/// One stored vote as seen by a score rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ballot {
    pub user_id: UserId,
    pub value: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Folds the ballots of one (item, tag) pair into its score.
///
/// Implementations must be pure: the same ballots always produce the same score,
/// otherwise recomputation stops being idempotent.
pub trait ScoreRule: Send + Sync + std::fmt::Debug {
    fn score(&self, ballots: &[Ballot]) -> i64;
}

/// Plain signed sum, every voter weighted equally.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawSum;

impl ScoreRule for RawSum {
    fn score(&self, ballots: &[Ballot]) -> i64 {
        ballots
            .iter()
            .fold(0i64, |acc, ballot| acc.saturating_add(ballot.value))
    }
}
