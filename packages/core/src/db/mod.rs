//! Collaborator Layer
//!
//! Contracts the engine consumes (content, backlinks, graph persistence, page storage)
//! and an in-memory implementation of all of them.

pub mod error;
pub mod memory_store;
pub mod store;

pub use error::StoreError;
pub use memory_store::InMemoryStore;
pub use store::{BacklinkSource, ContentSource, GraphStore, PageStore, StoreResult};
