//! PageGraph Core Graph Construction Engine
//!
//! This crate builds relationship graphs out of linked content pages. It owns the
//! graph aggregate, mines free-form page text for cross-references, and walks those
//! references (depth-bounded, cycle-safe) to assemble graphs from a database or a
//! single page.
//!
//! # Architecture
//!
//! - **Owned arena**: A [`Graph`] owns its nodes and edges keyed by id; edges can only
//!   point at nodes present in the same graph
//! - **Immutable settings**: [`GraphSettings::with`] returns a new value per patch
//! - **Narrow collaborators**: Content, backlinks and graph persistence are consumed
//!   through the async traits in [`db`]
//! - **Atomic runs**: A generated graph is saved once, after traversal completes
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, Edge, GraphSettings, Graph, Backlink, PageRecord)
//! - [`services`] - BacklinkExtractor and GraphGenerator
//! - [`db`] - Collaborator contracts and the in-memory store
//! - [`config`] - Engine configuration
//! - [`logging`] - Tracing subscriber setup

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::GraphEngineConfig;
pub use models::*;
pub use services::*;
