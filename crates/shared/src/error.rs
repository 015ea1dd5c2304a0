use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::GraphQlErrorItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    /// Maps the backend's `extensions.code` string onto the shared code set.
    /// Unknown codes collapse to `Internal`.
    pub fn from_graphql_code(code: &str) -> Self {
        match code {
            "invalid-jwt" | "invalid-headers" | "unauthorized" => Self::Unauthorized,
            "access-denied" | "permission-denied" | "permission-error" => Self::Forbidden,
            "not-found" => Self::NotFound,
            "validation-failed" | "constraint-violation" | "data-exception" => Self::Validation,
            "rate-limited" => Self::RateLimited,
            _ => Self::Internal,
        }
    }
}

/// Error reported by the remote application's API, normalized from the
/// GraphQL `errors` array.
#[derive(Debug, Clone, Error)]
#[error("{code:?}: {message}")]
pub struct RemoteApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl RemoteApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<GraphQlErrorItem> for RemoteApiError {
    fn from(item: GraphQlErrorItem) -> Self {
        let code = item
            .extensions
            .as_ref()
            .and_then(|extensions| extensions.code.as_deref())
            .map(ErrorCode::from_graphql_code)
            .unwrap_or(ErrorCode::Internal);
        Self {
            code,
            message: item.message,
        }
    }
}
