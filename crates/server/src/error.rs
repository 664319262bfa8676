#![forbid(unsafe_code)]

use tv_storage::StoreError;

/// Failures as the wire reports them.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Internal error")]
    Internal(#[source] StoreError),
    #[error("Internal error")]
    Serialize(#[from] serde_json::Error),
}

impl ApiError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::MethodNotFound(_) => "method_not_found",
            Self::Internal(_) | Self::Serialize(_) => "internal",
        }
    }

    pub(crate) fn code(&self) -> i64 {
        match self {
            Self::BadRequest(_) => -32602,
            Self::Unauthorized => -32001,
            Self::NotFound(_) => -32004,
            Self::MethodNotFound(_) => -32601,
            Self::Internal(_) | Self::Serialize(_) => -32603,
        }
    }

    pub(crate) fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized => 401,
            Self::NotFound(_) | Self::MethodNotFound(_) => 404,
            Self::Internal(_) | Self::Serialize(_) => 500,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InvalidInput(message) => Self::BadRequest(message.to_string()),
            StoreError::UnknownItem => Self::NotFound("Item not found"),
            StoreError::UnknownAssociation => Self::NotFound("Tag not found on item"),
            other => Self::Internal(other),
        }
    }
}
