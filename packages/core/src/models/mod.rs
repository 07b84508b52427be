//! Data Models
//!
//! This module contains the core data structures of the graph engine:
//!
//! - `Node` / `Edge` - vertices and relations, created from `NewNode` / `NewEdge`
//! - `GraphSettings` - immutable settings bundle with per-section patches
//! - `Graph` - aggregate enforcing referential integrity over nodes and edges
//! - `PageRecord`, `Backlink`, `BacklinkRecord`, `ExtractedLink` - content-side records

mod edge;
mod graph;
mod node;
mod page;
mod settings;

pub use edge::{
    Edge, EdgeDisplaySettings, EdgeMetadata, EdgeStyle, EdgeType, EdgeUpdate, NewEdge,
    DEFAULT_EDGE_WEIGHT,
};
pub use graph::{Graph, GraphError, GraphMetadataUpdate, GraphSnapshot, GraphStats, MergeOutcome};
pub use node::{
    NewNode, Node, NodeDisplaySettings, NodeMetadata, NodeShape, NodeType, NodeUpdate, Position,
    Properties,
};
pub use page::{Backlink, BacklinkRecord, ExtractedLink, PageRecord};
pub use settings::{
    FilterSettings, FilterSettingsPatch, GraphSettings, GraphSettingsPatch, InteractionSettings,
    InteractionSettingsPatch, LayoutAlgorithm, PhysicsSettings, PhysicsSettingsPatch,
    RelationshipSettings, RelationshipSettingsPatch, VisualSettings, VisualSettingsPatch,
};

#[cfg(test)]
mod graph_test;
