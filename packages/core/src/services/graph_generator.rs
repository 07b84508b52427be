//! Graph Generator
//!
//! Builds graphs by walking backlinks outward from a database's pages or from a single
//! page, and combines existing graphs.
//!
//! # Traversal
//!
//! Every generation run carries one `RunState`: a visited map (external content id →
//! node id) and the set of edges added so far. It is passed by `&mut` through every
//! recursive call of that run and never copied, so:
//!
//! - a content id gets at most one node per graph
//! - a content id is expanded at most once, which also terminates cyclic reference
//!   chains without any explicit cycle detection
//! - an edge of a given type is added at most once per node pair, checked in O(1)
//!
//! Sibling branches run strictly one after another (depth-first); the only suspension
//! points are the content and backlink lookups.
//!
//! # Persistence
//!
//! A run saves its graph exactly once, after traversal finishes. Any failure before
//! that (missing database/page/graph, access denied, store error) aborts the run with
//! nothing persisted.

use crate::config::GraphEngineConfig;
use crate::db::{BacklinkSource, ContentSource, GraphStore};
use crate::models::{
    EdgeMetadata, EdgeType, Graph, GraphError, GraphSettings, MergeOutcome, NewEdge, NewNode,
    NodeMetadata, NodeType, NodeUpdate, PageRecord, Properties,
};
use crate::services::error::{GraphServiceError, ResourceKind, ServiceResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Traversal state scoped to one generation run
#[derive(Default)]
struct RunState {
    /// External content id → node id
    visited: HashMap<String, String>,
    /// (source node, target node, type) of every edge added in this run
    linked: HashSet<(String, String, EdgeType)>,
}

impl RunState {
    /// Node standing for `page`, created on first sight; the flag tells whether it is new
    fn node_for(
        &mut self,
        graph: &mut Graph,
        page: &PageRecord,
        node_type: NodeType,
    ) -> ServiceResult<(String, bool)> {
        if let Some(existing) = self.visited.get(&page.id) {
            return Ok((existing.clone(), false));
        }

        let id = add_content_node(graph, page, node_type)?;
        self.visited.insert(page.id.clone(), id.clone());
        Ok((id, true))
    }

    /// Add `edge` unless one of the same type already joins the same pair
    fn link(&mut self, graph: &mut Graph, edge: NewEdge) {
        let key = (edge.source_id.clone(), edge.target_id.clone(), edge.edge_type);
        if self.linked.insert(key) {
            graph.add_edge(edge);
        }
    }
}

/// Arguments of a generation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub name: String,
    pub description: Option<String>,
    /// Backlink hops to follow; the configured default when `None`
    pub max_depth: Option<u32>,
    /// Settings of the new graph; defaults when `None`
    pub settings: Option<GraphSettings>,
}

impl GenerationOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_settings(mut self, settings: GraphSettings) -> Self {
        self.settings = Some(settings);
        self
    }
}

/// Outcome of [`GraphGenerator::sync_graph`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub graph_id: String,
    pub updated: usize,
    pub unchanged: usize,
    /// Nodes whose content no longer resolves
    pub missing: usize,
}

/// Builds, combines and refreshes graphs from external content
pub struct GraphGenerator {
    content: Arc<dyn ContentSource>,
    backlinks: Arc<dyn BacklinkSource>,
    graphs: Arc<dyn GraphStore>,
    config: GraphEngineConfig,
}

impl GraphGenerator {
    pub fn new(
        content: Arc<dyn ContentSource>,
        backlinks: Arc<dyn BacklinkSource>,
        graphs: Arc<dyn GraphStore>,
    ) -> Self {
        Self::with_config(content, backlinks, graphs, GraphEngineConfig::default())
    }

    pub fn with_config(
        content: Arc<dyn ContentSource>,
        backlinks: Arc<dyn BacklinkSource>,
        graphs: Arc<dyn GraphStore>,
        config: GraphEngineConfig,
    ) -> Self {
        Self {
            content,
            backlinks,
            graphs,
            config,
        }
    }

    /// Use one store for all three collaborators
    pub fn from_store<S>(store: Arc<S>, config: GraphEngineConfig) -> Self
    where
        S: ContentSource + BacklinkSource + GraphStore + 'static,
    {
        Self::with_config(store.clone(), store.clone(), store, config)
    }

    pub fn config(&self) -> &GraphEngineConfig {
        &self.config
    }

    /// Build a graph from a database, its pages, and their backlinks
    ///
    /// # Errors
    ///
    /// - `NotFound` if the database does not resolve
    /// - `ValidationFailed` for an empty name or a depth above `max_allowed_depth`
    pub async fn generate_from_database(
        &self,
        user_id: &str,
        database_id: &str,
        options: GenerationOptions,
    ) -> ServiceResult<Graph> {
        let max_depth = self.resolve_depth(&options)?;
        tracing::info!(
            "Generating graph from database {} (max depth {})",
            database_id,
            max_depth
        );

        let Some(database) = self.content.find_page_by_id(database_id, user_id).await? else {
            tracing::warn!("Graph generation aborted: database {} not found", database_id);
            return Err(GraphServiceError::not_found(ResourceKind::Database, database_id));
        };

        let mut graph = new_graph(user_id, options).with_source_database(database_id);
        let mut run = RunState::default();

        let (database_node_id, _) = run.node_for(&mut graph, &database, NodeType::Database)?;

        let pages = self
            .content
            .find_pages_by_container(database_id, user_id)
            .await?;

        for page in &pages {
            let (page_node_id, created) = run.node_for(&mut graph, page, NodeType::Page)?;
            run.link(
                &mut graph,
                NewEdge::new(&database_node_id, &page_node_id, EdgeType::DatabaseRelation),
            );

            if created && max_depth > 0 {
                self.process_backlinks(
                    &mut graph,
                    user_id,
                    &page.id,
                    &page_node_id,
                    &mut run,
                    max_depth,
                )
                .await?;
            }
        }

        let saved = self.graphs.save(graph).await?;
        tracing::info!(
            "Generated graph {} from database {}: {} nodes, {} edges",
            saved.id(),
            database_id,
            saved.node_count(),
            saved.edge_count()
        );
        Ok(saved)
    }

    /// Build a graph rooted at a single page and its backlinks
    ///
    /// # Errors
    ///
    /// - `NotFound` if the page does not resolve
    /// - `ValidationFailed` for an empty name or a depth above `max_allowed_depth`
    pub async fn generate_from_page(
        &self,
        user_id: &str,
        page_id: &str,
        options: GenerationOptions,
    ) -> ServiceResult<Graph> {
        let max_depth = self.resolve_depth(&options)?;
        tracing::info!(
            "Generating graph from page {} (max depth {})",
            page_id,
            max_depth
        );

        let Some(page) = self.content.find_page_by_id(page_id, user_id).await? else {
            tracing::warn!("Graph generation aborted: page {} not found", page_id);
            return Err(GraphServiceError::not_found(ResourceKind::Page, page_id));
        };

        let mut graph = new_graph(user_id, options).with_source_page(page_id);
        let mut run = RunState::default();

        let (root_node_id, _) = run.node_for(&mut graph, &page, NodeType::Page)?;

        if max_depth > 0 {
            self.process_backlinks(
                &mut graph,
                user_id,
                &page.id,
                &root_node_id,
                &mut run,
                max_depth,
            )
            .await?;
        }

        let saved = self.graphs.save(graph).await?;
        tracing::info!(
            "Generated graph {} from page {}: {} nodes, {} edges",
            saved.id(),
            page_id,
            saved.node_count(),
            saved.edge_count()
        );
        Ok(saved)
    }

    /// Add the pages referencing `content_id` and recurse into them
    ///
    /// Each backlink becomes a Reference edge source → target. Source pages seen
    /// earlier in the run reuse their node and are not expanded again.
    fn process_backlinks<'a>(
        &'a self,
        graph: &'a mut Graph,
        user_id: &'a str,
        content_id: &'a str,
        node_id: &'a str,
        run: &'a mut RunState,
        depth: u32,
    ) -> Pin<Box<dyn Future<Output = ServiceResult<()>> + Send + 'a>> {
        Box::pin(async move {
            if depth == 0 {
                return Ok(());
            }

            let backlinks = self
                .backlinks
                .extract_backlinks_for_page(content_id, user_id)
                .await?;
            tracing::debug!(
                "Expanding {} backlinks of {} at depth {}",
                backlinks.len(),
                content_id,
                depth
            );

            for backlink in backlinks {
                let source = &backlink.source_page;
                let (source_node_id, created) = run.node_for(graph, source, NodeType::Page)?;

                let metadata = EdgeMetadata {
                    created_at: backlink.created_at,
                    context: backlink.context.clone(),
                    properties: Properties::new(),
                };
                run.link(
                    graph,
                    NewEdge::new(&source_node_id, node_id, EdgeType::Reference)
                        .with_label(backlink.context.clone())
                        .bidirectional(backlink.is_bidirectional)
                        .with_metadata(metadata),
                );

                if created && depth > 1 {
                    self.process_backlinks(
                        graph,
                        user_id,
                        &source.id,
                        &source_node_id,
                        run,
                        depth - 1,
                    )
                    .await?;
                }
            }

            Ok(())
        })
    }

    /// Union several graphs into a new one owned by `user_id`
    ///
    /// Settings are taken from the first graph in `graph_ids`; sources are merged in
    /// input order, so earlier graphs win on node id collisions.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `graph_ids` is empty or `name` is blank
    /// - `NotFound` if any graph is missing
    /// - `Forbidden` if the user cannot access any of them
    pub async fn combine_graphs<S: AsRef<str>>(
        &self,
        user_id: &str,
        graph_ids: &[S],
        name: &str,
        description: Option<String>,
    ) -> ServiceResult<Graph> {
        if graph_ids.is_empty() {
            return Err(GraphServiceError::validation_failed(
                "At least one graph id is required to combine graphs",
            ));
        }
        validate_name(name)?;

        let mut sources = Vec::with_capacity(graph_ids.len());
        for graph_id in graph_ids {
            sources.push(self.load_readable(user_id, graph_id.as_ref()).await?);
        }

        let settings = sources
            .first()
            .map(|g| g.settings().clone())
            .unwrap_or_default();
        let mut combined = Graph::new(name, user_id)
            .with_description(description)
            .with_settings(settings);

        for source in &sources {
            let outcome = combined.merge_graph(source);
            tracing::debug!(
                "Merged graph {}: {} nodes added, {} edges added",
                source.id(),
                outcome.nodes_added,
                outcome.edges_added
            );
        }

        let saved = self.graphs.save(combined).await?;
        tracing::info!(
            "Combined {} graphs into {}: {} nodes, {} edges",
            sources.len(),
            saved.id(),
            saved.node_count(),
            saved.edge_count()
        );
        Ok(saved)
    }

    /// Merge `source_graph_id` into `target_graph_id` and persist the target
    ///
    /// The user must own the target and be able to read the source.
    pub async fn merge_into_graph(
        &self,
        user_id: &str,
        target_graph_id: &str,
        source_graph_id: &str,
    ) -> ServiceResult<(Graph, MergeOutcome)> {
        let mut target = self.load_editable(user_id, target_graph_id).await?;
        let source = self.load_readable(user_id, source_graph_id).await?;

        let outcome = target.merge_graph(&source);
        let saved = self.graphs.save(target).await?;
        tracing::info!(
            "Merged graph {} into {}: {} nodes added, {} edges added",
            source_graph_id,
            target_graph_id,
            outcome.nodes_added,
            outcome.edges_added
        );
        Ok((saved, outcome))
    }

    /// Refresh page and database nodes from their content by field comparison
    ///
    /// Title, icon, description, last modification, tags and properties are compared;
    /// nodes with any difference are updated. The graph is saved only when something
    /// changed.
    pub async fn sync_graph(&self, user_id: &str, graph_id: &str) -> ServiceResult<SyncReport> {
        let mut graph = self.load_editable(user_id, graph_id).await?;
        let mut report = SyncReport {
            graph_id: graph_id.to_string(),
            ..Default::default()
        };

        let synced: Vec<(String, String)> = graph
            .nodes()
            .filter(|n| matches!(n.node_type, NodeType::Page | NodeType::Database))
            .map(|n| (n.id.clone(), n.external_id.clone()))
            .collect();

        for (node_id, external_id) in synced {
            let Some(page) = self.content.find_page_by_id(&external_id, user_id).await? else {
                report.missing += 1;
                continue;
            };

            let update = graph
                .get_node(&node_id)
                .map(|node| {
                    let mut update = NodeUpdate::new();
                    if node.title != page.title {
                        update.title = Some(page.title.clone());
                    }
                    if node.icon != page.icon {
                        update.icon = Some(page.icon.clone());
                    }
                    let metadata = metadata_for(&page);
                    if node.metadata != metadata {
                        update.metadata = Some(metadata);
                    }
                    update
                })
                .unwrap_or_default();

            if update.is_empty() {
                report.unchanged += 1;
            } else {
                graph.update_node(&node_id, update);
                report.updated += 1;
            }
        }

        if report.updated > 0 {
            self.graphs.save(graph).await?;
        }

        tracing::info!(
            "Synced graph {}: {} updated, {} unchanged, {} missing",
            graph_id,
            report.updated,
            report.unchanged,
            report.missing
        );
        Ok(report)
    }

    fn resolve_depth(&self, options: &GenerationOptions) -> ServiceResult<u32> {
        validate_name(&options.name)?;
        if !options.settings.as_ref().map_or(true, GraphSettings::is_finite) {
            return Err(GraphServiceError::validation_failed(
                "Graph settings must contain only finite numbers",
            ));
        }

        let depth = options.max_depth.unwrap_or(self.config.default_max_depth);
        if depth > self.config.max_allowed_depth {
            return Err(GraphServiceError::validation_failed(format!(
                "max depth {} exceeds the allowed maximum of {}",
                depth, self.config.max_allowed_depth
            )));
        }
        Ok(depth)
    }

    async fn load_graph(&self, graph_id: &str) -> ServiceResult<Graph> {
        match self.graphs.find_by_id(graph_id).await? {
            Some(graph) => Ok(graph),
            None => {
                tracing::warn!("Graph {} not found", graph_id);
                Err(GraphServiceError::not_found(ResourceKind::Graph, graph_id))
            }
        }
    }

    async fn load_readable(&self, user_id: &str, graph_id: &str) -> ServiceResult<Graph> {
        let graph = self.load_graph(graph_id).await?;
        if !graph.can_access(user_id) {
            tracing::warn!("User {} denied read access to graph {}", user_id, graph_id);
            return Err(GraphServiceError::forbidden(user_id, graph_id));
        }
        Ok(graph)
    }

    async fn load_editable(&self, user_id: &str, graph_id: &str) -> ServiceResult<Graph> {
        let graph = self.load_graph(graph_id).await?;
        if !graph.can_edit(user_id) {
            tracing::warn!("User {} denied write access to graph {}", user_id, graph_id);
            return Err(GraphServiceError::forbidden(user_id, graph_id));
        }
        Ok(graph)
    }
}

fn validate_name(name: &str) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(GraphServiceError::validation_failed(
            "Graph name must not be empty",
        ));
    }
    Ok(())
}

fn new_graph(user_id: &str, options: GenerationOptions) -> Graph {
    Graph::new(options.name, user_id)
        .with_description(options.description)
        .with_settings(options.settings.unwrap_or_default())
}

fn metadata_for(page: &PageRecord) -> NodeMetadata {
    NodeMetadata {
        description: page.description.clone(),
        last_modified: page.last_modified,
        tags: page.tags.clone(),
        properties: page.properties.clone(),
    }
}

/// Add a node standing for `page`, returning its id
fn add_content_node(graph: &mut Graph, page: &PageRecord, node_type: NodeType) -> ServiceResult<String> {
    let data = NewNode::new(&page.id, &page.title, node_type)
        .with_icon(page.icon.clone())
        .with_metadata(metadata_for(page));

    graph
        .add_node(data)
        .map(|node| node.id)
        .ok_or_else(|| GraphError::DuplicateNode(page.id.clone()).into())
}
