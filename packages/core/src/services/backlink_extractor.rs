//! Backlink Extractor
//!
//! Mines page text for cross-references and stores them as backlinks on the referenced
//! pages.
//!
//! # Link Syntax
//!
//! Two forms are recognised in a single left-to-right scan. At each position the wiki
//! form is tried first:
//!
//! - `[[target-id]]` - context is the surrounding text, up to `context_window`
//!   characters on each side of the match, wrapped in `...` markers
//! - `[display text](target-id)` - context is the display text
//!
//! A page never backlinks itself: references to the scanning page are dropped.
//!
//! # Passes
//!
//! - [`BacklinkExtractor::extract_backlinks_for_all_pages`] - global pass, O(P²) worst case
//! - [`BacklinkExtractor::extract_backlinks_for_page`] - one target, O(P)

use crate::config::GraphEngineConfig;
use crate::db::PageStore;
use crate::models::{Backlink, ExtractedLink, PageRecord};
use crate::services::error::{GraphServiceError, ResourceKind, ServiceResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

/// Characters kept on each side of a wiki link when no config is supplied
pub const DEFAULT_CONTEXT_WINDOW: usize = 50;

const ELLIPSIS: &str = "...";

// Alternation order matters: the wiki form must win at a shared start position.
// Groups: 1 = wiki target, 2 = display text, 3 = markdown target
const LINK_PATTERN: &str = r"\[\[([^\]]+)\]\]|\[([^\]]+)\]\(([^)]+)\)";

fn link_regex() -> &'static Regex {
    static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_REGEX.get_or_init(|| Regex::new(LINK_PATTERN).expect("link pattern is a valid regex"))
}

/// Extract references from page text using the default context window
///
/// `None` or empty content yields no links.
///
/// # Examples
///
/// ```
/// # use pagegraph_core::services::backlink_extractor::extract_links_from_content;
/// let links = extract_links_from_content(Some("See [[pg2]] and [text](pg3)"), "pg1");
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].target_page_id, "pg2");
/// assert!(links[0].context.starts_with("..."));
/// assert_eq!(links[1].context, "text");
///
/// assert!(extract_links_from_content(None, "pg1").is_empty());
/// ```
pub fn extract_links_from_content(content: Option<&str>, source_page_id: &str) -> Vec<ExtractedLink> {
    extract_links_with_window(content, source_page_id, DEFAULT_CONTEXT_WINDOW)
}

/// Extract references from page text, keeping `window` characters of wiki-link context
pub fn extract_links_with_window(
    content: Option<&str>,
    source_page_id: &str,
    window: usize,
) -> Vec<ExtractedLink> {
    let Some(content) = content.filter(|c| !c.is_empty()) else {
        return Vec::new();
    };

    let mut links = Vec::new();

    for cap in link_regex().captures_iter(content) {
        let (target, context) = if let Some(target) = cap.get(1) {
            let whole = cap.get(0).map_or(target.range(), |m| m.range());
            (
                target.as_str(),
                surrounding_context(content, whole.start, whole.end, window),
            )
        } else {
            match (cap.get(2), cap.get(3)) {
                (Some(text), Some(target)) => (target.as_str(), text.as_str().to_string()),
                _ => continue,
            }
        };

        let target = target.trim();
        if target.is_empty() || target == source_page_id {
            continue;
        }

        links.push(ExtractedLink {
            source_page_id: source_page_id.to_string(),
            target_page_id: target.to_string(),
            context,
        });
    }

    links
}

/// Up to `window` characters before `start` and after `end`, wrapped in ellipses
fn surrounding_context(content: &str, start: usize, end: usize, window: usize) -> String {
    let from = content[..start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map_or(start, |(i, _)| i);
    let to = content[end..]
        .char_indices()
        .nth(window)
        .map_or(content.len(), |(i, _)| end + i);

    format!("{ELLIPSIS}{}{ELLIPSIS}", &content[from..to])
}

/// Counts reported by a global extraction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSummary {
    pub pages_scanned: usize,
    /// Links whose target is a known page
    pub links_found: usize,
    /// Targets whose backlinks were replaced with freshly discovered ones
    pub targets_updated: usize,
    /// Targets whose stale backlinks were emptied
    pub targets_cleared: usize,
}

/// Computes and stores backlinks over a [`PageStore`]
pub struct BacklinkExtractor {
    store: Arc<dyn PageStore>,
    config: GraphEngineConfig,
}

impl BacklinkExtractor {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self::with_config(store, GraphEngineConfig::default())
    }

    pub fn with_config(store: Arc<dyn PageStore>, config: GraphEngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &GraphEngineConfig {
        &self.config
    }

    /// Extract references using this extractor's context window
    pub fn extract_links(&self, content: Option<&str>, source_page_id: &str) -> Vec<ExtractedLink> {
        extract_links_with_window(content, source_page_id, self.config.context_window)
    }

    /// Recompute backlinks for every page
    ///
    /// Each target that receives at least one link in this pass gets its backlinks
    /// replaced by freshly minted ones. Targets that receive none are emptied when
    /// `clear_stale_backlinks` is set and left untouched otherwise.
    pub async fn extract_backlinks_for_all_pages(&self) -> ServiceResult<ExtractionSummary> {
        let pages = self.store.list_pages().await?;
        tracing::info!("Extracting backlinks across {} pages", pages.len());

        let page_ids: HashSet<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        let mut summary = ExtractionSummary {
            pages_scanned: pages.len(),
            ..Default::default()
        };

        let mut inbound: HashMap<String, Vec<Backlink>> = HashMap::new();
        for page in &pages {
            for link in self.extract_links(page.content.as_deref(), &page.id) {
                if !page_ids.contains(link.target_page_id.as_str()) {
                    continue;
                }
                summary.links_found += 1;
                inbound
                    .entry(link.target_page_id.clone())
                    .or_default()
                    .push(backlink_from(page, link));
            }
        }

        for page in &pages {
            match inbound.remove(&page.id) {
                Some(backlinks) => {
                    tracing::debug!("Page {} has {} backlinks", page.id, backlinks.len());
                    self.store.save_backlinks(&page.id, backlinks).await?;
                    summary.targets_updated += 1;
                }
                None if self.config.clear_stale_backlinks => {
                    if !self.store.load_backlinks(&page.id).await?.is_empty() {
                        tracing::debug!("Clearing stale backlinks of page {}", page.id);
                        self.store.save_backlinks(&page.id, Vec::new()).await?;
                        summary.targets_cleared += 1;
                    }
                }
                None => {}
            }
        }

        tracing::info!(
            "Backlink extraction finished: {} links, {} targets updated, {} cleared",
            summary.links_found,
            summary.targets_updated,
            summary.targets_cleared
        );
        Ok(summary)
    }

    /// Recompute and store the backlinks of one page, returning how many were found
    ///
    /// # Errors
    ///
    /// `NotFound` when `page_id` does not resolve.
    pub async fn extract_backlinks_for_page(&self, page_id: &str) -> ServiceResult<usize> {
        if self.store.find_page(page_id).await?.is_none() {
            tracing::warn!("Backlink extraction aborted: page {} not found", page_id);
            return Err(GraphServiceError::not_found(ResourceKind::Page, page_id));
        }

        let pages = self.store.list_pages().await?;
        let backlinks: Vec<Backlink> = pages
            .iter()
            .filter(|page| page.id != page_id)
            .flat_map(|page| {
                self.extract_links(page.content.as_deref(), &page.id)
                    .into_iter()
                    .filter(move |link| link.target_page_id == page_id)
                    .map(move |link| backlink_from(page, link))
            })
            .collect();

        let count = backlinks.len();
        self.store.save_backlinks(page_id, backlinks).await?;
        tracing::debug!("Page {} has {} backlinks", page_id, count);
        Ok(count)
    }

    /// Stored backlinks of a page
    pub async fn backlinks_for(&self, page_id: &str) -> ServiceResult<Vec<Backlink>> {
        Ok(self.store.load_backlinks(page_id).await?)
    }
}

fn backlink_from(source: &PageRecord, link: ExtractedLink) -> Backlink {
    Backlink::new(
        link.source_page_id,
        source.title.clone(),
        link.target_page_id,
        Some(link.context),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wiki_and_markdown_links() {
        let links = extract_links_from_content(Some("See [[pg2]] and [text](pg3)"), "pg1");

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].source_page_id, "pg1");
        assert_eq!(links[0].target_page_id, "pg2");
        assert_eq!(links[0].context, "...See [[pg2]] and [text](pg3)...");
        assert_eq!(links[1].target_page_id, "pg3");
        assert_eq!(links[1].context, "text");
    }

    #[test]
    fn test_empty_and_missing_content() {
        assert!(extract_links_from_content(Some(""), "pg1").is_empty());
        assert!(extract_links_from_content(None, "pg1").is_empty());
        assert!(extract_links_from_content(Some("no links here"), "pg1").is_empty());
    }

    #[test]
    fn test_self_references_are_dropped() {
        let links = extract_links_from_content(
            Some("[[pg1]] [me](pg1) [[ pg1 ]] [[pg2]]"),
            "pg1",
        );
        assert_eq!(links.len(), 1);
        assert!(links.iter().all(|l| l.target_page_id != "pg1"));
    }

    #[test]
    fn test_context_window_truncates_both_sides() {
        let before = "a".repeat(80);
        let after = "b".repeat(80);
        let content = format!("{}[[target]]{}", before, after);

        let links = extract_links_with_window(Some(content.as_str()), "src", 10);

        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].context,
            format!("...{}[[target]]{}...", "a".repeat(10), "b".repeat(10))
        );
    }

    #[test]
    fn test_default_window_is_fifty_chars() {
        let content = format!("{}[[t]]{}", "x".repeat(200), "y".repeat(200));
        let links = extract_links_from_content(Some(content.as_str()), "src");

        let expected_len = ELLIPSIS.len() * 2 + 50 + "[[t]]".len() + 50;
        assert_eq!(links[0].context.len(), expected_len);
    }

    #[test]
    fn test_context_window_respects_char_boundaries() {
        let content = "héllo wörld ☃☃☃ [[page]] ünïcode ☃";
        let links = extract_links_with_window(Some(content), "src", 3);
        assert_eq!(links[0].context, "...☃☃ [[page]] ün...");
    }

    #[test]
    fn test_links_are_returned_in_text_order() {
        let links = extract_links_from_content(
            Some("[c](p3) then [[p1]] then [[p2]] and [a](p4)"),
            "src",
        );
        let targets: Vec<&str> = links.iter().map(|l| l.target_page_id.as_str()).collect();
        assert_eq!(targets, vec!["p3", "p1", "p2", "p4"]);
    }

    #[test]
    fn test_unterminated_patterns_are_ignored() {
        let links = extract_links_from_content(Some("[[open and [text](  ) and [x]"), "src");
        assert!(links.is_empty());
    }
}
