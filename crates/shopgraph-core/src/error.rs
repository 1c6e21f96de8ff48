//! Centralized error types for shopgraph.

use thiserror::Error;

/// Main error type for analytics and ingestion operations.
#[derive(Error, Debug)]
pub enum ShopError {
    /// The caller sent something we cannot act on. Nothing was written.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Graph store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Graph store query failed: {0}")]
    StoreQuery(String),

    #[error("Graph store did not answer within {0} seconds")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for shopgraph operations.
pub type ShopResult<T> = Result<T, ShopError>;

impl ShopError {
    /// Create an invalid input error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a store query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::StoreQuery(msg.into())
    }

    /// Create a store unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Whether the failure was caused by the caller rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
