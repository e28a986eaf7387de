//! Data models
//!
//! Shared between catalog-server and its API clients.
//! Product ids are 24-digit hex strings on the wire, `u128` in the store.

pub mod category;
pub mod product;
pub mod report;

// Re-exports
pub use category::*;
pub use product::*;
pub use report::*;
