//! Error taxonomy for the computation and service layers
//!
//! Individual numeric fields that fail to parse never surface here: tolerant
//! parsing returns `None` and the affected derived value is simply omitted.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Requested entity does not exist (flock, guide rows for a breed/year)
    #[error("not found: {0}")]
    NotFound(String),

    /// An entity exists but is missing data required for the computation
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Malformed input rejected before computation begins
    #[error("validation error: {0}")]
    Validation(String),

    /// Persistence-layer failure
    #[error("database error: {0}")]
    Database(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
