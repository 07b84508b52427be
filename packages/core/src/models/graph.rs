//! Graph Aggregate
//!
//! `Graph` owns its nodes and edges in id-keyed maps and is the only way to mutate
//! them. It enforces:
//!
//! 1. Every edge references two node ids present in the graph
//! 2. Removing a node removes every edge touching it
//! 3. Node and edge ids are unique within the graph
//! 4. `updated_at` strictly advances on every mutating call
//! 5. Positions, weights and display sizes are finite numbers
//!
//! Edge creation with a missing endpoint is not an error: [`Graph::add_edge`] returns
//! `None` and leaves the graph untouched, so bulk callers can skip bad edges and keep
//! going. Callers that want to abort use [`Graph::try_add_edge`].
//!
//! # Serialization
//!
//! `Graph` serializes through [`GraphSnapshot`], a flat form with nested settings and
//! node/edge arrays sorted by id. Deserializing re-validates the invariants above.
//!
//! ```rust
//! use pagegraph_core::models::{EdgeType, Graph, NewEdge, NewNode, NodeType};
//!
//! let mut graph = Graph::new("Research", "user-1");
//! let a = graph.add_node(NewNode::new("page-a", "A", NodeType::Page)).unwrap();
//! let b = graph.add_node(NewNode::new("page-b", "B", NodeType::Page)).unwrap();
//!
//! assert!(graph.add_edge(NewEdge::new(&a.id, &b.id, EdgeType::Reference)).is_some());
//! assert!(graph.add_edge(NewEdge::new(&a.id, "missing", EdgeType::Reference)).is_none());
//!
//! let json = serde_json::to_string(&graph).unwrap();
//! let restored: Graph = serde_json::from_str(&json).unwrap();
//! assert_eq!(restored, graph);
//! ```

use crate::models::edge::{Edge, EdgeType, EdgeUpdate, NewEdge};
use crate::models::node::{NewNode, Node, NodeType, NodeUpdate, Position};
use crate::models::settings::{GraphSettings, GraphSettingsPatch};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

/// Structural errors of the graph aggregate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Edge endpoint is not a node of the graph
    #[error("Edge {edge_id} references missing node {missing_node_id}")]
    InvalidReference {
        edge_id: String,
        missing_node_id: String,
    },

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Duplicate edge id: {0}")]
    DuplicateEdge(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    /// NaN or infinite float, which JSON cannot carry
    #[error("Non-finite {field} on {id}")]
    NonFiniteValue { id: String, field: String },
}

/// Partial update of the descriptive graph fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphMetadataUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

/// Counts reported by [`Graph::merge_graph`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub nodes_added: usize,
    pub nodes_skipped: usize,
    pub edges_added: usize,
    pub edges_skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_type: HashMap<NodeType, usize>,
    pub edges_by_type: HashMap<EdgeType, usize>,
    pub bidirectional_edges: usize,
}

/// A graph of content nodes and their relations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "GraphSnapshot", try_from = "GraphSnapshot")]
pub struct Graph {
    id: String,
    name: String,
    owner_id: String,
    description: Option<String>,
    settings: GraphSettings,
    tags: Vec<String>,
    shared_with: BTreeSet<String>,
    is_public: bool,
    source_database_id: Option<String>,
    source_page_id: Option<String>,
    nodes: HashMap<String, Node>,
    edges: HashMap<String, Edge>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Graph {
    /// Create an empty graph with a generated id and default settings
    pub fn new(name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            owner_id: owner_id.into(),
            description: None,
            settings: GraphSettings::default(),
            tags: Vec::new(),
            shared_with: BTreeSet::new(),
            is_public: false,
            source_database_id: None,
            source_page_id: None,
            nodes: HashMap::new(),
            edges: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_settings(mut self, settings: GraphSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_source_database(mut self, database_id: impl Into<String>) -> Self {
        self.source_database_id = Some(database_id.into());
        self
    }

    pub fn with_source_page(mut self, page_id: impl Into<String>) -> Self {
        self.source_page_id = Some(page_id.into());
        self
    }

    //
    // ACCESSORS
    //

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn shared_with(&self) -> impl Iterator<Item = &str> {
        self.shared_with.iter().map(String::as_str)
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn source_database_id(&self) -> Option<&str> {
        self.source_database_id.as_deref()
    }

    pub fn source_page_id(&self) -> Option<&str> {
        self.source_page_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// First node standing for the given external content id
    pub fn find_node_by_external_id(&self, external_id: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.external_id == external_id)
    }

    /// Edge of the given type leading from `source_id` to `target_id`
    pub fn find_edge(&self, source_id: &str, target_id: &str, edge_type: EdgeType) -> Option<&Edge> {
        self.edges.values().find(|e| {
            e.edge_type == edge_type && e.source_id == source_id && e.target_id == target_id
        })
    }

    /// Owner, explicitly shared users, and everyone for public graphs
    pub fn can_access(&self, user_id: &str) -> bool {
        self.is_public || self.owner_id == user_id || self.shared_with.contains(user_id)
    }

    /// Only the owner may change a graph
    pub fn can_edit(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    //
    // NODE OPERATIONS
    //

    /// Insert a node, generating its id when absent
    ///
    /// Returns `None` without mutating when the id is already taken or a float field
    /// is not finite.
    pub fn add_node(&mut self, data: NewNode) -> Option<Node> {
        let node = Node::from_new(data);
        if self.nodes.contains_key(&node.id) {
            tracing::debug!("Rejected node with duplicate id {}", node.id);
            return None;
        }
        if !node.is_finite() {
            tracing::debug!("Rejected node {} with non-finite values", node.id);
            return None;
        }

        self.nodes.insert(node.id.clone(), node.clone());
        self.touch();
        Some(node)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, id: &str) -> bool {
        if self.nodes.remove(id).is_none() {
            return false;
        }

        self.edges.retain(|_, edge| !edge.touches(id));
        self.touch();
        true
    }

    /// Apply a partial update to a node, returning the updated node
    ///
    /// An update that would leave a non-finite float is rejected as a whole.
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> Option<Node> {
        let mut updated = self.nodes.get(id)?.clone();
        updated.apply(update);
        if !updated.is_finite() {
            tracing::debug!("Rejected update of node {} with non-finite values", id);
            return None;
        }

        self.nodes.insert(updated.id.clone(), updated.clone());
        self.touch();
        Some(updated)
    }

    pub fn update_node_title(&mut self, id: &str, title: impl Into<String>) -> bool {
        self.mutate_node(id, |node| node.update_title(title)).is_some()
    }

    pub fn update_node_position(&mut self, id: &str, position: Position) -> bool {
        if !position.is_finite() {
            return false;
        }
        self.mutate_node(id, |node| node.update_position(position))
            .is_some()
    }

    /// Returns the new pinned state, or `None` when the node does not exist
    pub fn toggle_node_pinned(&mut self, id: &str) -> Option<bool> {
        self.mutate_node(id, Node::toggle_pinned)
    }

    /// Returns the new expanded state, or `None` when the node does not exist
    pub fn toggle_node_expanded(&mut self, id: &str) -> Option<bool> {
        self.mutate_node(id, Node::toggle_expanded)
    }

    fn mutate_node<T>(&mut self, id: &str, f: impl FnOnce(&mut Node) -> T) -> Option<T> {
        let node = self.nodes.get_mut(id)?;
        let result = f(node);
        self.touch();
        Some(result)
    }

    //
    // EDGE OPERATIONS
    //

    /// Insert an edge between two existing nodes
    ///
    /// Returns `None` and leaves the graph unchanged when either endpoint is missing
    /// or the edge id is already taken.
    pub fn add_edge(&mut self, data: NewEdge) -> Option<Edge> {
        match self.try_add_edge(data) {
            Ok(edge) => Some(edge),
            Err(e) => {
                tracing::debug!("Skipped edge: {}", e);
                None
            }
        }
    }

    /// Insert an edge, reporting why it was rejected
    pub fn try_add_edge(&mut self, data: NewEdge) -> Result<Edge, GraphError> {
        let edge = Edge::from_new(data);
        self.check_edge(&edge)?;

        self.edges.insert(edge.id.clone(), edge.clone());
        self.touch();
        Ok(edge)
    }

    fn check_edge(&self, edge: &Edge) -> Result<(), GraphError> {
        for endpoint in [&edge.source_id, &edge.target_id] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::InvalidReference {
                    edge_id: edge.id.clone(),
                    missing_node_id: endpoint.clone(),
                });
            }
        }

        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id.clone()));
        }

        if !edge.is_finite() {
            let field = if edge.weight.is_finite() { "width" } else { "weight" };
            return Err(GraphError::NonFiniteValue {
                id: edge.id.clone(),
                field: field.to_string(),
            });
        }

        Ok(())
    }

    /// Apply a partial update to an edge; a non-finite weight rejects the whole update
    pub fn update_edge(&mut self, id: &str, update: EdgeUpdate) -> Option<Edge> {
        let mut updated = self.edges.get(id)?.clone();
        updated.apply(update);
        if !updated.is_finite() {
            tracing::debug!("Rejected update of edge {} with non-finite values", id);
            return None;
        }

        self.edges.insert(updated.id.clone(), updated.clone());
        self.touch();
        Some(updated)
    }

    pub fn remove_edge(&mut self, id: &str) -> bool {
        if self.edges.remove(id).is_none() {
            return false;
        }
        self.touch();
        true
    }

    /// Edges where the node is source or target
    pub fn get_node_edges(&self, node_id: &str) -> Vec<&Edge> {
        self.edges.values().filter(|e| e.touches(node_id)).collect()
    }

    /// Distinct neighbours of a node, in either direction
    pub fn get_connected_nodes(&self, node_id: &str) -> Vec<&Node> {
        let mut seen = HashSet::new();
        self.get_node_edges(node_id)
            .into_iter()
            .filter_map(|edge| edge.other_end(node_id))
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    //
    // GRAPH-LEVEL OPERATIONS
    //

    pub fn update_metadata(&mut self, update: GraphMetadataUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        self.touch();
    }

    /// Replace settings with `settings.with(patch)`
    ///
    /// Returns false, leaving settings untouched, if the result holds a non-finite number.
    pub fn update_settings(&mut self, patch: GraphSettingsPatch) -> bool {
        let settings = self.settings.with(patch);
        if !settings.is_finite() {
            tracing::debug!("Rejected non-finite settings for graph {}", self.id);
            return false;
        }
        self.settings = settings;
        self.touch();
        true
    }

    /// Returns true when the user was not already in the share list
    pub fn share_with_user(&mut self, user_id: impl Into<String>) -> bool {
        let added = self.shared_with.insert(user_id.into());
        self.touch();
        added
    }

    /// Returns true when the user was in the share list
    pub fn unshare_from_user(&mut self, user_id: &str) -> bool {
        let removed = self.shared_with.remove(user_id);
        self.touch();
        removed
    }

    pub fn set_public_visibility(&mut self, is_public: bool) {
        self.is_public = is_public;
        self.touch();
    }

    /// Remove all nodes and edges
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.touch();
    }

    /// Union another graph into this one
    ///
    /// Nodes whose id already exists here are skipped (the existing node wins). Edges are
    /// added only when both endpoints exist after the node union and the edge id is new.
    pub fn merge_graph(&mut self, other: &Graph) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        for node in other.nodes.values() {
            if self.nodes.contains_key(&node.id) {
                outcome.nodes_skipped += 1;
            } else {
                self.nodes.insert(node.id.clone(), node.clone());
                outcome.nodes_added += 1;
            }
        }

        for edge in other.edges.values() {
            if self.check_edge(edge).is_ok() {
                self.edges.insert(edge.id.clone(), edge.clone());
                outcome.edges_added += 1;
            } else {
                outcome.edges_skipped += 1;
            }
        }

        self.touch();
        outcome
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            ..Default::default()
        };

        for node in self.nodes.values() {
            *stats.nodes_by_type.entry(node.node_type).or_default() += 1;
        }
        for edge in self.edges.values() {
            *stats.edges_by_type.entry(edge.edge_type).or_default() += 1;
            if edge.is_bidirectional {
                stats.bidirectional_edges += 1;
            }
        }

        stats
    }

    /// Advance `updated_at`, strictly, even when the clock has not moved
    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    //
    // SERIALIZATION
    //

    /// Flat, canonical representation (nodes and edges sorted by id)
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let mut nodes: Vec<Node> = self.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let mut edges: Vec<Edge> = self.edges.values().cloned().collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));

        GraphSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            owner_id: self.owner_id.clone(),
            description: self.description.clone(),
            settings: self.settings.clone(),
            tags: self.tags.clone(),
            shared_with: self.shared_with.iter().cloned().collect(),
            is_public: self.is_public,
            source_database_id: self.source_database_id.clone(),
            source_page_id: self.source_page_id.clone(),
            nodes,
            edges,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Rebuild a graph from its snapshot, re-checking every invariant
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        if snapshot.id.is_empty() {
            return Err(GraphError::MissingField("id".to_string()));
        }
        if snapshot.owner_id.is_empty() {
            return Err(GraphError::MissingField("ownerId".to_string()));
        }

        let mut nodes = HashMap::with_capacity(snapshot.nodes.len());
        for node in snapshot.nodes {
            if nodes.contains_key(&node.id) {
                return Err(GraphError::DuplicateNode(node.id));
            }
            nodes.insert(node.id.clone(), node);
        }

        let mut graph = Self {
            id: snapshot.id,
            name: snapshot.name,
            owner_id: snapshot.owner_id,
            description: snapshot.description,
            settings: snapshot.settings,
            tags: snapshot.tags,
            shared_with: snapshot.shared_with.into_iter().collect(),
            is_public: snapshot.is_public,
            source_database_id: snapshot.source_database_id,
            source_page_id: snapshot.source_page_id,
            nodes,
            edges: HashMap::with_capacity(snapshot.edges.len()),
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        };

        for edge in snapshot.edges {
            graph.check_edge(&edge)?;
            graph.edges.insert(edge.id.clone(), edge);
        }

        Ok(graph)
    }
}

/// Flat serialized form of a [`Graph`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: GraphSettings,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub shared_with: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub source_database_id: Option<String>,
    #[serde(default)]
    pub source_page_id: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Graph> for GraphSnapshot {
    fn from(graph: Graph) -> Self {
        graph.to_snapshot()
    }
}

impl TryFrom<GraphSnapshot> for Graph {
    type Error = GraphError;

    fn try_from(snapshot: GraphSnapshot) -> Result<Self, Self::Error> {
        Graph::from_snapshot(snapshot)
    }
}
