//! Shared types for the catalog service
//!
//! Common types used across crates: domain models, error codes and
//! the unified API response structure.

pub mod error;
pub mod models;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode, ErrorKind};
