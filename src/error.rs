//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.
//!
//! Absent or expired keys are not errors anywhere in this crate; lookups
//! return `Option` instead. The error type covers the conditions that are
//! actual failures, chiefly rejecting an invalid configuration at
//! construction time.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
