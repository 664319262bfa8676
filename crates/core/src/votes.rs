#![forbid(unsafe_code)]

/// What a user asks the ledger to do with their vote on an (item, tag) pair.
///
/// On the wire this is still the bare integer -1/0/1; `Retract` is the 0 case and
/// removes the user's ledger row instead of storing a zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteChoice {
    Upvote,
    Downvote,
    Retract,
}

impl VoteChoice {
    pub fn from_wire(value: i64) -> Result<Self, VoteChoiceError> {
        match value {
            1 => Ok(Self::Upvote),
            -1 => Ok(Self::Downvote),
            0 => Ok(Self::Retract),
            other => Err(VoteChoiceError::OutOfRange(other)),
        }
    }

    pub fn wire_value(self) -> i64 {
        match self {
            Self::Upvote => 1,
            Self::Downvote => -1,
            Self::Retract => 0,
        }
    }

    /// The value stored in the ledger, or `None` when the choice deletes the row.
    pub fn ledger_value(self) -> Option<i64> {
        match self {
            Self::Upvote => Some(1),
            Self::Downvote => Some(-1),
            Self::Retract => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteChoiceError {
    OutOfRange(i64),
}

impl VoteChoiceError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::OutOfRange(_) => "vote must be -1, 0, or 1",
        }
    }
}
