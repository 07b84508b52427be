//! Collaborator Contracts
//!
//! The graph engine never talks to a database, an HTTP API or a rate-limited content
//! client directly. It consumes them through these traits:
//!
//! - [`ContentSource`] - resolves pages and the pages of a database (container)
//! - [`BacklinkSource`] - resolved inbound references of a page
//! - [`GraphStore`] - graph persistence (upsert by id)
//! - [`PageStore`] - page listing and backlink storage used by the extractor
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so network and embedded backends fit
//! 2. **Ownership Semantics**: `save` takes the graph by value and hands it back
//! 3. **Not-found is data**: lookups return `Option`, not an error; the services decide
//!    whether a missing record aborts the operation
//!
//! Implementations must be `Send + Sync` so a service can hold them behind `Arc`.

use crate::db::error::StoreError;
use crate::models::{Backlink, BacklinkRecord, Graph, PageRecord};
use async_trait::async_trait;

pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to external content, scoped to a user
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// All pages belonging to a database (container)
    async fn find_pages_by_container(
        &self,
        container_id: &str,
        user_id: &str,
    ) -> StoreResult<Vec<PageRecord>>;

    /// A single page or database by id
    async fn find_page_by_id(&self, id: &str, user_id: &str) -> StoreResult<Option<PageRecord>>;
}

/// Inbound references of a page, resolved to their source pages
#[async_trait]
pub trait BacklinkSource: Send + Sync {
    async fn extract_backlinks_for_page(
        &self,
        page_id: &str,
        user_id: &str,
    ) -> StoreResult<Vec<BacklinkRecord>>;
}

/// Graph persistence
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Graph>>;

    /// Upsert keyed by graph id
    async fn save(&self, graph: Graph) -> StoreResult<Graph>;
}

/// Page listing and backlink storage for the backlink extractor
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Every page, with content
    async fn list_pages(&self) -> StoreResult<Vec<PageRecord>>;

    async fn find_page(&self, id: &str) -> StoreResult<Option<PageRecord>>;

    /// Stored backlinks of a target page (empty when none were ever saved)
    async fn load_backlinks(&self, target_page_id: &str) -> StoreResult<Vec<Backlink>>;

    /// Replace the stored backlinks of a target page
    async fn save_backlinks(&self, target_page_id: &str, backlinks: Vec<Backlink>)
        -> StoreResult<()>;
}
