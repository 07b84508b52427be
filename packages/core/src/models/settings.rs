//! Graph Settings
//!
//! `GraphSettings` is an immutable bundle of layout, visual, relationship, filter,
//! physics and interaction options. It is never mutated in place: [`GraphSettings::with`]
//! takes a [`GraphSettingsPatch`] and returns a new value.
//!
//! Merging is per section. A section left as `None` in the patch passes through
//! unchanged; a section given in the patch is shallow-merged field by field over the
//! previous value.
//!
//! ```rust
//! use pagegraph_core::models::{GraphSettings, GraphSettingsPatch, PhysicsSettingsPatch};
//!
//! let base = GraphSettings::default();
//! let tuned = base.with(GraphSettingsPatch {
//!     physics: Some(PhysicsSettingsPatch {
//!         gravity: Some(0.5),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! });
//!
//! assert_eq!(tuned.physics.gravity, 0.5);
//! assert_eq!(tuned.physics.link_distance, base.physics.link_distance);
//! assert_eq!(tuned.visual, base.visual);
//! ```

use crate::models::edge::{Edge, EdgeType};
use crate::models::node::{Node, NodeType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutAlgorithm {
    #[default]
    ForceDirected,
    Hierarchical,
    Radial,
    Grid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSettings {
    pub node_size: f64,
    pub edge_width: f64,
    pub show_labels: bool,
    pub show_icons: bool,
    pub color_scheme: String,
    pub background_color: String,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            node_size: 8.0,
            edge_width: 1.0,
            show_labels: true,
            show_icons: true,
            color_scheme: "default".to_string(),
            background_color: "#ffffff".to_string(),
        }
    }
}

/// Which relation kinds are drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipSettings {
    pub show_references: bool,
    pub show_parent_child: bool,
    pub show_database_relations: bool,
    pub show_custom: bool,
    pub highlight_bidirectional: bool,
}

impl Default for RelationshipSettings {
    fn default() -> Self {
        Self {
            show_references: true,
            show_parent_child: true,
            show_database_relations: true,
            show_custom: true,
            highlight_bidirectional: false,
        }
    }
}

impl RelationshipSettings {
    pub fn shows(&self, edge_type: EdgeType) -> bool {
        match edge_type {
            EdgeType::Reference => self.show_references,
            EdgeType::ParentChild => self.show_parent_child,
            EdgeType::DatabaseRelation => self.show_database_relations,
            EdgeType::Custom => self.show_custom,
        }
    }
}

/// Display filters. Empty lists mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSettings {
    pub node_types: Vec<NodeType>,
    pub edge_types: Vec<EdgeType>,
    pub tags: Vec<String>,
    pub min_edge_weight: f64,
    pub search_query: Option<String>,
}

impl FilterSettings {
    /// Whether a node passes the type, tag and search filters
    pub fn allows_node(&self, node: &Node) -> bool {
        if !self.node_types.is_empty() && !self.node_types.contains(&node.node_type) {
            return false;
        }

        if !self.tags.is_empty() && !node.metadata.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }

        match self.search_query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => node
                .title
                .to_lowercase()
                .contains(&query.to_lowercase()),
            _ => true,
        }
    }

    /// Whether an edge passes the type and weight filters
    pub fn allows_edge(&self, edge: &Edge) -> bool {
        if !self.edge_types.is_empty() && !self.edge_types.contains(&edge.edge_type) {
            return false;
        }

        edge.weight >= self.min_edge_weight
    }
}

/// Force simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicsSettings {
    pub enabled: bool,
    pub gravity: f64,
    pub link_distance: f64,
    pub charge_strength: f64,
    pub friction: f64,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            gravity: 0.1,
            link_distance: 100.0,
            charge_strength: -300.0,
            friction: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSettings {
    pub draggable: bool,
    pub zoomable: bool,
    pub pan_enabled: bool,
    pub hover_highlight: bool,
    pub multi_select: bool,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            draggable: true,
            zoomable: true,
            pan_enabled: true,
            hover_highlight: true,
            multi_select: false,
        }
    }
}

/// Immutable settings bundle of a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphSettings {
    pub layout: LayoutAlgorithm,
    pub visual: VisualSettings,
    pub relationship: RelationshipSettings,
    pub filter: FilterSettings,
    pub physics: PhysicsSettings,
    pub interaction: InteractionSettings,
}

impl GraphSettings {
    /// Return a new settings value with `patch` applied section by section
    pub fn with(&self, patch: GraphSettingsPatch) -> Self {
        Self {
            layout: patch.layout.unwrap_or(self.layout),
            visual: merge_section(&self.visual, patch.visual),
            relationship: merge_section(&self.relationship, patch.relationship),
            filter: merge_section(&self.filter, patch.filter),
            physics: merge_section(&self.physics, patch.physics),
            interaction: merge_section(&self.interaction, patch.interaction),
        }
    }

    /// Whether every numeric setting is finite, and so survives JSON serialization
    pub fn is_finite(&self) -> bool {
        [
            self.visual.node_size,
            self.visual.edge_width,
            self.filter.min_edge_weight,
            self.physics.gravity,
            self.physics.link_distance,
            self.physics.charge_strength,
            self.physics.friction,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Whether an edge should be drawn under the relationship and filter sections
    pub fn shows_edge(&self, edge: &Edge) -> bool {
        self.relationship.shows(edge.edge_type) && self.filter.allows_edge(edge)
    }
}

/// A section of settings that can be shallow-merged with its patch type
trait SectionPatch<S> {
    fn merge_onto(self, base: &S) -> S;
}

fn merge_section<S: Clone, P: SectionPatch<S>>(base: &S, patch: Option<P>) -> S {
    match patch {
        Some(patch) => patch.merge_onto(base),
        None => base.clone(),
    }
}

/// Defines a patch struct with one `Option` per section field and its shallow merge
macro_rules! section_patch {
    ($(#[$meta:meta])* $patch:ident for $section:ident { $($field:ident: $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $patch {
            $(pub $field: Option<$ty>,)*
        }

        impl SectionPatch<$section> for $patch {
            fn merge_onto(self, base: &$section) -> $section {
                $section {
                    $($field: self.$field.unwrap_or_else(|| base.$field.clone()),)*
                }
            }
        }
    };
}

section_patch!(
    /// Partial [`VisualSettings`]
    VisualSettingsPatch for VisualSettings {
        node_size: f64,
        edge_width: f64,
        show_labels: bool,
        show_icons: bool,
        color_scheme: String,
        background_color: String,
    }
);

section_patch!(
    /// Partial [`RelationshipSettings`]
    RelationshipSettingsPatch for RelationshipSettings {
        show_references: bool,
        show_parent_child: bool,
        show_database_relations: bool,
        show_custom: bool,
        highlight_bidirectional: bool,
    }
);

section_patch!(
    /// Partial [`FilterSettings`]
    FilterSettingsPatch for FilterSettings {
        node_types: Vec<NodeType>,
        edge_types: Vec<EdgeType>,
        tags: Vec<String>,
        min_edge_weight: f64,
        search_query: Option<String>,
    }
);

section_patch!(
    /// Partial [`PhysicsSettings`]
    PhysicsSettingsPatch for PhysicsSettings {
        enabled: bool,
        gravity: f64,
        link_distance: f64,
        charge_strength: f64,
        friction: f64,
    }
);

section_patch!(
    /// Partial [`InteractionSettings`]
    InteractionSettingsPatch for InteractionSettings {
        draggable: bool,
        zoomable: bool,
        pan_enabled: bool,
        hover_highlight: bool,
        multi_select: bool,
    }
);

/// Partial [`GraphSettings`]; `None` sections pass through unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphSettingsPatch {
    pub layout: Option<LayoutAlgorithm>,
    pub visual: Option<VisualSettingsPatch>,
    pub relationship: Option<RelationshipSettingsPatch>,
    pub filter: Option<FilterSettingsPatch>,
    pub physics: Option<PhysicsSettingsPatch>,
    pub interaction: Option<InteractionSettingsPatch>,
}
