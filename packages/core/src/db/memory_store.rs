//! In-Memory Store
//!
//! `InMemoryStore` implements every collaborator contract over plain maps. It backs the
//! test suite and embedders that keep their pages in memory.
//!
//! Backlinks are resolved on read: [`BacklinkSource::extract_backlinks_for_page`] joins
//! the stored [`Backlink`]s of a page with their source pages, and marks a backlink
//! bidirectional when the target also links back to the source.

use crate::db::error::StoreError;
use crate::db::store::{BacklinkSource, ContentSource, GraphStore, PageStore, StoreResult};
use crate::models::{Backlink, BacklinkRecord, Graph, PageRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    pages: RwLock<HashMap<String, PageRecord>>,
    backlinks: RwLock<HashMap<String, Vec<Backlink>>>,
    graphs: RwLock<HashMap<String, Graph>>,

    /// Number of `GraphStore::save` calls, so callers can observe persistence
    graph_saves: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with pages
    pub fn with_pages(pages: impl IntoIterator<Item = PageRecord>) -> Self {
        let map = pages.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            pages: RwLock::new(map),
            ..Default::default()
        }
    }

    /// Insert or replace a page
    pub async fn upsert_page(&self, page: PageRecord) {
        self.pages.write().await.insert(page.id.clone(), page);
    }

    pub async fn remove_page(&self, id: &str) -> Option<PageRecord> {
        self.pages.write().await.remove(id)
    }

    /// Store a graph without counting it as a save
    pub async fn insert_graph(&self, graph: Graph) {
        self.graphs
            .write()
            .await
            .insert(graph.id().to_string(), graph);
    }

    pub async fn graph_count(&self) -> usize {
        self.graphs.read().await.len()
    }

    pub fn graph_save_count(&self) -> usize {
        self.graph_saves.load(Ordering::Acquire)
    }
}

#[async_trait]
impl ContentSource for InMemoryStore {
    async fn find_pages_by_container(
        &self,
        container_id: &str,
        _user_id: &str,
    ) -> StoreResult<Vec<PageRecord>> {
        let pages = self.pages.read().await;
        let mut found: Vec<PageRecord> = pages
            .values()
            .filter(|p| p.container_id.as_deref() == Some(container_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn find_page_by_id(&self, id: &str, _user_id: &str) -> StoreResult<Option<PageRecord>> {
        Ok(self.pages.read().await.get(id).cloned())
    }
}

#[async_trait]
impl BacklinkSource for InMemoryStore {
    async fn extract_backlinks_for_page(
        &self,
        page_id: &str,
        _user_id: &str,
    ) -> StoreResult<Vec<BacklinkRecord>> {
        let backlinks = self.backlinks.read().await;
        let pages = self.pages.read().await;

        let Some(inbound) = backlinks.get(page_id) else {
            return Ok(Vec::new());
        };

        let records = inbound
            .iter()
            .filter_map(|backlink| {
                let source_page = pages.get(&backlink.source_page_id)?.clone();
                let is_bidirectional = backlinks
                    .get(&backlink.source_page_id)
                    .is_some_and(|back| back.iter().any(|b| b.source_page_id == page_id));

                Some(BacklinkRecord {
                    source_page,
                    context: backlink.context.clone(),
                    is_bidirectional,
                    created_at: backlink.created_at,
                })
            })
            .collect();

        Ok(records)
    }
}

#[async_trait]
impl GraphStore for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Graph>> {
        Ok(self.graphs.read().await.get(id).cloned())
    }

    async fn save(&self, graph: Graph) -> StoreResult<Graph> {
        if graph.id().is_empty() {
            return Err(StoreError::backend("Cannot save a graph without an id"));
        }

        self.graphs
            .write()
            .await
            .insert(graph.id().to_string(), graph.clone());
        self.graph_saves.fetch_add(1, Ordering::AcqRel);
        Ok(graph)
    }
}

#[async_trait]
impl PageStore for InMemoryStore {
    async fn list_pages(&self) -> StoreResult<Vec<PageRecord>> {
        let mut pages: Vec<PageRecord> = self.pages.read().await.values().cloned().collect();
        pages.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(pages)
    }

    async fn find_page(&self, id: &str) -> StoreResult<Option<PageRecord>> {
        Ok(self.pages.read().await.get(id).cloned())
    }

    async fn load_backlinks(&self, target_page_id: &str) -> StoreResult<Vec<Backlink>> {
        Ok(self
            .backlinks
            .read()
            .await
            .get(target_page_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_backlinks(
        &self,
        target_page_id: &str,
        backlinks: Vec<Backlink>,
    ) -> StoreResult<()> {
        self.backlinks
            .write()
            .await
            .insert(target_page_id.to_string(), backlinks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_by_container_are_sorted() {
        let store = InMemoryStore::with_pages([
            PageRecord::new("p2", "Two").in_container("db"),
            PageRecord::new("p1", "One").in_container("db"),
            PageRecord::new("p3", "Elsewhere").in_container("other"),
        ]);

        let pages = store.find_pages_by_container("db", "user").await.unwrap();
        let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_backlinks_resolve_source_and_direction() {
        let store = InMemoryStore::with_pages([
            PageRecord::new("a", "A"),
            PageRecord::new("b", "B"),
            PageRecord::new("c", "C"),
        ]);
        store
            .save_backlinks(
                "a",
                vec![
                    Backlink::new("b", "B", "a", Some("ctx".to_string())),
                    Backlink::new("c", "C", "a", None),
                    Backlink::new("gone", "Gone", "a", None),
                ],
            )
            .await
            .unwrap();
        store
            .save_backlinks("b", vec![Backlink::new("a", "A", "b", None)])
            .await
            .unwrap();

        let records = store.extract_backlinks_for_page("a", "user").await.unwrap();

        assert_eq!(records.len(), 2);
        let from_b = records.iter().find(|r| r.source_page.id == "b").unwrap();
        let from_c = records.iter().find(|r| r.source_page.id == "c").unwrap();
        assert!(from_b.is_bidirectional);
        assert_eq!(from_b.context.as_deref(), Some("ctx"));
        assert!(!from_c.is_bidirectional);
    }

    #[test]
    fn test_remove_page() {
        let store = InMemoryStore::with_pages([PageRecord::new("p1", "One")]);

        let removed = tokio_test::block_on(store.remove_page("p1"));
        assert_eq!(removed.map(|p| p.title), Some("One".to_string()));
        assert!(tokio_test::block_on(store.find_page("p1")).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_counts_and_upserts() {
        let store = InMemoryStore::new();
        let graph = Graph::new("G", "owner");
        let id = graph.id().to_string();

        store.save(graph.clone()).await.unwrap();
        store.save(graph).await.unwrap();

        assert_eq!(store.graph_save_count(), 2);
        assert_eq!(store.graph_count().await, 1);
        assert!(store.find_by_id(&id).await.unwrap().is_some());
    }
}
