//! Business Services
//!
//! - `BacklinkExtractor` - mines page text for references and stores backlinks
//! - `GraphGenerator` - builds graphs from databases or pages, combines and syncs them
//!
//! Services talk to storage only through the contracts in [`crate::db`].

pub mod backlink_extractor;
pub mod error;
pub mod graph_generator;

pub use backlink_extractor::{
    extract_links_from_content, extract_links_with_window, BacklinkExtractor, ExtractionSummary,
    DEFAULT_CONTEXT_WINDOW,
};
pub use error::{GraphServiceError, ResourceKind, ServiceResult};
pub use graph_generator::{GenerationOptions, GraphGenerator, SyncReport};
