//! Error kind classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Transport-independent error kind
///
/// Every [`ErrorCode`] maps to exactly one kind. The HTTP layer only looks at
/// the kind when choosing a status, so the services never deal with
/// transport concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller supplied invalid or insufficient input
    Business,
    /// Entity absent
    NotFound,
    /// Authenticated but not allowed
    Forbidden,
    /// Not authenticated
    Unauthorized,
    /// Store failure, exhausted retries, inconsistent state
    Server,
}

impl ErrorKind {
    /// Whether the original detail must stay out of responses
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server)
    }
}

impl ErrorCode {
    /// Get the kind for this error code
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound
            | Self::ProductNotFound
            | Self::CategoryProductsNotFound
            | Self::ReportNotFound => ErrorKind::NotFound,

            Self::NotAuthenticated => ErrorKind::Unauthorized,

            Self::PermissionDenied => ErrorKind::Forbidden,

            Self::InternalError | Self::DatabaseError | Self::UpdateConflict => ErrorKind::Server,

            Self::Success
            | Self::ValidationFailed
            | Self::TooManyRequests
            | Self::InvalidProductId
            | Self::InvalidPagination => ErrorKind::Business,
        }
    }
}
