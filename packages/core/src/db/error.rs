//! Store Error Types
//!
//! Errors surfaced by collaborator stores (content source, backlink source, page store,
//! graph store). Service-level errors wrap these.

use thiserror::Error;

/// Store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Record was expected to exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Backend failure (connection, query, lock poisoning)
    #[error("Store backend failed: {0}")]
    Backend(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
