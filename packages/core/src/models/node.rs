//! Graph Node Data Structures
//!
//! A `Node` is one vertex of a [`Graph`](crate::models::Graph). Each node stands for a
//! unit of external content (a page, a database, or an external resource) and keeps a
//! reference to it in `external_id`.
//!
//! Nodes are created through [`Graph::add_node`](crate::models::Graph::add_node) from a
//! [`NewNode`] and only removed through `Graph::remove_node`, so the graph can keep its
//! edges consistent.
//!
//! # Examples
//!
//! ```rust
//! use pagegraph_core::models::{Graph, NewNode, NodeType};
//!
//! let mut graph = Graph::new("Reading list", "user-1");
//! let node = graph
//!     .add_node(NewNode::new("page-1", "Rust ownership", NodeType::Page))
//!     .unwrap();
//! assert_eq!(node.title, "Rust ownership");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Opaque property bag carried by nodes and edges
pub type Properties = HashMap<String, serde_json::Value>;

/// Kind of content a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Page,
    Database,
    External,
}

/// Canvas coordinates of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Descriptive fields copied from the source content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeShape {
    #[default]
    Circle,
    Square,
    Diamond,
}

/// Per-node rendering overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDisplaySettings {
    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub size: Option<f64>,

    #[serde(default)]
    pub shape: NodeShape,

    #[serde(default)]
    pub is_hidden: bool,

    #[serde(default = "default_true")]
    pub show_label: bool,
}

impl Default for NodeDisplaySettings {
    fn default() -> Self {
        Self {
            color: None,
            size: None,
            shape: NodeShape::Circle,
            is_hidden: false,
            show_label: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A vertex of the graph
///
/// # Fields
///
/// - `id`: Unique identifier within the owning graph
/// - `external_id`: Id of the content (page/database) this node stands for
/// - `title`: Display title
/// - `node_type`: Page, Database or External
/// - `position`: Optional pinned canvas position
/// - `metadata`: Description, last modification, tags and open properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub external_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub metadata: NodeMetadata,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_expanded: bool,
    #[serde(default)]
    pub display_settings: NodeDisplaySettings,
}

impl Node {
    /// Build a node from creation data, generating a UUID when no id is supplied
    pub fn from_new(data: NewNode) -> Self {
        Self {
            id: data.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            external_id: data.external_id,
            title: data.title,
            node_type: data.node_type,
            icon: data.icon,
            position: data.position,
            metadata: data.metadata,
            is_pinned: data.is_pinned,
            is_expanded: data.is_expanded,
            display_settings: data.display_settings,
        }
    }

    /// Whether every float field is finite, and so survives JSON serialization
    pub fn is_finite(&self) -> bool {
        self.position.map_or(true, |p| p.is_finite())
            && self.display_settings.size.map_or(true, f64::is_finite)
    }

    pub fn update_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn update_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    /// Let the layout engine place the node again
    pub fn clear_position(&mut self) {
        self.position = None;
    }

    /// Flip the pinned flag, returning the new value
    pub fn toggle_pinned(&mut self) -> bool {
        self.is_pinned = !self.is_pinned;
        self.is_pinned
    }

    /// Flip the expanded flag, returning the new value
    pub fn toggle_expanded(&mut self) -> bool {
        self.is_expanded = !self.is_expanded;
        self.is_expanded
    }

    pub fn update_metadata(&mut self, metadata: NodeMetadata) {
        self.metadata = metadata;
    }

    /// Apply a partial update, leaving `None` fields untouched
    pub fn apply(&mut self, update: NodeUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(icon) = update.icon {
            self.icon = icon;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(metadata) = update.metadata {
            self.metadata = metadata;
        }
        if let Some(is_pinned) = update.is_pinned {
            self.is_pinned = is_pinned;
        }
        if let Some(is_expanded) = update.is_expanded {
            self.is_expanded = is_expanded;
        }
        if let Some(display_settings) = update.display_settings {
            self.display_settings = display_settings;
        }
    }
}

/// Creation data for a node
///
/// `id` is optional; when `None` the graph generates one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub id: Option<String>,
    pub external_id: String,
    pub title: String,
    pub node_type: NodeType,
    pub icon: Option<String>,
    pub position: Option<Position>,
    pub metadata: NodeMetadata,
    pub is_pinned: bool,
    pub is_expanded: bool,
    pub display_settings: NodeDisplaySettings,
}

impl NewNode {
    pub fn new(external_id: impl Into<String>, title: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: None,
            external_id: external_id.into(),
            title: title.into(),
            node_type,
            icon: None,
            position: None,
            metadata: NodeMetadata::default(),
            is_pinned: false,
            is_expanded: false,
            display_settings: NodeDisplaySettings::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Partial node update
///
/// Double-`Option` fields (`icon`, `position`) distinguish "leave as is" (`None`)
/// from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub title: Option<String>,
    pub icon: Option<Option<String>>,
    pub position: Option<Option<Position>>,
    pub metadata: Option<NodeMetadata>,
    pub is_pinned: Option<bool>,
    pub is_expanded: Option<bool>,
    pub display_settings: Option<NodeDisplaySettings>,
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
