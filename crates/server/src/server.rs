#![forbid(unsafe_code)]

use crate::{ApiError, handlers, json_rpc_error_with_data, json_rpc_response};
use serde_json::{Value, json};
use tv_storage::{SqliteStore, StoreError};

pub(crate) struct TagServer {
    store: SqliteStore,
}

impl TagServer {
    pub(crate) fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Dispatches one request. Notifications (no id) are executed but never answered.
    pub(crate) fn handle(&mut self, request: crate::JsonRpcRequest) -> Option<Value> {
        let expects_response = !matches!(request.id.as_ref(), None | Some(Value::Null));
        let method = request.method.as_str();
        let params = request.params.as_ref();

        let outcome = match method {
            "tags.add" => handlers::tags_add(&mut self.store, params),
            "tags.vote" => handlers::tags_vote(&mut self.store, params),
            "tags.list" => handlers::tags_list(&self.store, params),
            "items.tags" => handlers::items_tags(&self.store, params),
            other => Err(ApiError::MethodNotFound(other.to_string())),
        };

        if let Err(err) = &outcome {
            log_failure(method, err);
        }
        if !expects_response {
            return None;
        }

        Some(match outcome {
            Ok(result) => json_rpc_response(request.id, result),
            Err(err) => json_rpc_error_with_data(
                request.id,
                err.code(),
                &err.to_string(),
                json!({ "kind": err.kind(), "status": err.status() }),
            ),
        })
    }
}

fn log_failure(method: &str, err: &ApiError) {
    match err {
        ApiError::Internal(source @ StoreError::ConsistencyViolation { .. }) => {
            tracing::error!(method, error = %source, "consistency violation");
        }
        ApiError::Internal(source) => {
            tracing::error!(
                method,
                error = %source,
                retryable = source.is_retryable(),
                "request failed"
            );
        }
        ApiError::Serialize(source) => {
            tracing::error!(method, error = %source, "response serialization failed");
        }
        other => {
            tracing::debug!(method, kind = other.kind(), error = %other, "request rejected");
        }
    }
}
