//! Graph Edge Data Structures
//!
//! An `Edge` is a directed relation between two nodes of the same graph. Bidirectional
//! edges are still stored once, with `source_id`/`target_id` recording the direction
//! in which the relation was discovered.

use crate::models::node::Properties;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default edge weight
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Kind of relation an edge represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeType {
    /// Textual cross-reference (backlink) between pages
    Reference,
    ParentChild,
    /// Membership of a page in a database
    DatabaseRelation,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMetadata {
    pub created_at: DateTime<Utc>,

    /// Text surrounding the reference that produced this edge
    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub properties: Properties,
}

impl Default for EdgeMetadata {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            context: None,
            properties: Properties::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Per-edge rendering overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDisplaySettings {
    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub width: Option<f64>,

    #[serde(default)]
    pub style: EdgeStyle,

    #[serde(default)]
    pub animated: bool,
}

/// A directed, optionally bidirectional, relation between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub is_bidirectional: bool,
    #[serde(default)]
    pub metadata: EdgeMetadata,
    #[serde(default)]
    pub display_settings: EdgeDisplaySettings,
}

fn default_weight() -> f64 {
    DEFAULT_EDGE_WEIGHT
}

impl Edge {
    /// Build an edge from creation data
    ///
    /// Endpoint existence is not checked here; that is the graph's job.
    pub fn from_new(data: NewEdge) -> Self {
        Self {
            id: data.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            source_id: data.source_id,
            target_id: data.target_id,
            edge_type: data.edge_type,
            label: data.label,
            weight: data.weight.unwrap_or(DEFAULT_EDGE_WEIGHT),
            is_bidirectional: data.is_bidirectional,
            metadata: data.metadata.unwrap_or_default(),
            display_settings: data.display_settings,
        }
    }

    /// Whether every float field is finite, and so survives JSON serialization
    pub fn is_finite(&self) -> bool {
        self.weight.is_finite() && self.display_settings.width.map_or(true, f64::is_finite)
    }

    /// Whether `node_id` is either endpoint
    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }

    /// Whether the edge leads from `from` to `to`, honouring bidirectional edges
    pub fn connects(&self, from: &str, to: &str) -> bool {
        (self.source_id == from && self.target_id == to)
            || (self.is_bidirectional && self.source_id == to && self.target_id == from)
    }

    /// The endpoint opposite to `node_id`, if `node_id` is an endpoint
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.source_id == node_id {
            Some(&self.target_id)
        } else if self.target_id == node_id {
            Some(&self.source_id)
        } else {
            None
        }
    }

    pub fn apply(&mut self, update: EdgeUpdate) {
        if let Some(edge_type) = update.edge_type {
            self.edge_type = edge_type;
        }
        if let Some(label) = update.label {
            self.label = label;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(is_bidirectional) = update.is_bidirectional {
            self.is_bidirectional = is_bidirectional;
        }
        if let Some(display_settings) = update.display_settings {
            self.display_settings = display_settings;
        }
    }
}

/// Creation data for an edge
#[derive(Debug, Clone, PartialEq)]
pub struct NewEdge {
    pub id: Option<String>,
    pub source_id: String,
    pub target_id: String,
    pub edge_type: EdgeType,
    pub label: Option<String>,
    /// Defaults to [`DEFAULT_EDGE_WEIGHT`]
    pub weight: Option<f64>,
    pub is_bidirectional: bool,
    /// Defaults to "created now, no context"
    pub metadata: Option<EdgeMetadata>,
    pub display_settings: EdgeDisplaySettings,
}

impl NewEdge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>, edge_type: EdgeType) -> Self {
        Self {
            id: None,
            source_id: source_id.into(),
            target_id: target_id.into(),
            edge_type,
            label: None,
            weight: None,
            is_bidirectional: false,
            metadata: None,
            display_settings: EdgeDisplaySettings::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn bidirectional(mut self, is_bidirectional: bool) -> Self {
        self.is_bidirectional = is_bidirectional;
        self
    }

    pub fn with_metadata(mut self, metadata: EdgeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Partial edge update; endpoints are immutable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeUpdate {
    pub edge_type: Option<EdgeType>,
    pub label: Option<Option<String>>,
    pub weight: Option<f64>,
    pub is_bidirectional: Option<bool>,
    pub display_settings: Option<EdgeDisplaySettings>,
}
