//! Service Layer Error Types
//!
//! Errors of the backlink extractor and graph generator. `NotFound` and `Forbidden`
//! abort the whole operation before anything is persisted. A missing edge endpoint is
//! not represented here: `Graph::add_edge` reports it as `None` so bulk callers can skip.

use crate::db::StoreError;
use crate::models::GraphError;
use thiserror::Error;

/// What kind of record a `NotFound` refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Database,
    Page,
    Graph,
    Node,
    Edge,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Database => "Database",
            ResourceKind::Page => "Page",
            ResourceKind::Graph => "Graph",
            ResourceKind::Node => "Node",
            ResourceKind::Edge => "Edge",
        };
        f.write_str(name)
    }
}

/// Service operation errors
#[derive(Error, Debug)]
pub enum GraphServiceError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    #[error("User {user_id} is not allowed to access graph {graph_id}")]
    Forbidden { user_id: String, graph_id: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Graph invariant violated: {0}")]
    Graph(#[from] GraphError),
}

impl GraphServiceError {
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn forbidden(user_id: impl Into<String>, graph_id: impl Into<String>) -> Self {
        Self::Forbidden {
            user_id: user_id.into(),
            graph_id: graph_id.into(),
        }
    }

    pub fn validation_failed(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}

pub type ServiceResult<T> = Result<T, GraphServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphServiceError::not_found(ResourceKind::Database, "db-1");
        assert_eq!(err.to_string(), "Database not found: db-1");
        assert!(err.is_not_found());

        let err = GraphServiceError::forbidden("u1", "g1");
        assert_eq!(err.to_string(), "User u1 is not allowed to access graph g1");
        assert!(err.is_forbidden());

        let err = GraphServiceError::validation_failed("graph ids must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation failed: graph ids must not be empty"
        );
    }

    #[test]
    fn test_store_error_converts() {
        let err: GraphServiceError = StoreError::backend("disk full").into();
        assert!(matches!(err, GraphServiceError::Store(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
