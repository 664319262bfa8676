#![forbid(unsafe_code)]

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("unknown item")]
    UnknownItem,
    #[error("tag not found on item")]
    UnknownAssociation,
    /// A transaction observed a state that contradicts a write it made itself.
    #[error("consistency violation: {detail}")]
    ConsistencyViolation { detail: &'static str },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownItem | Self::UnknownAssociation)
    }

    /// Storage failures abort the whole transaction, so the same call can be repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Sql(_))
    }
}
