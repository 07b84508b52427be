//! Content records consumed from the content source
//!
//! - `PageRecord` - a page (or database) as returned by the content source
//! - `Backlink` - stored value object recording that one page references another
//! - `BacklinkRecord` - a backlink resolved to its source page, as consumed by the generator
//! - `ExtractedLink` - a raw reference found in page text

use crate::models::node::Properties;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of external content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub properties: Properties,

    /// Free-form text scanned for references
    #[serde(default)]
    pub content: Option<String>,

    /// Database (container) the page belongs to
    #[serde(default)]
    pub container_id: Option<String>,
}

impl PageRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            icon: None,
            description: None,
            last_modified: None,
            tags: Vec::new(),
            properties: Properties::new(),
            content: None,
            container_id: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn in_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = Some(container_id.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Stored inbound reference of a target page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backlink {
    pub id: String,
    pub source_page_id: String,
    pub source_page_title: String,
    pub target_page_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub context: Option<String>,
}

impl Backlink {
    /// Mint a backlink with a fresh id
    pub fn new(
        source_page_id: impl Into<String>,
        source_page_title: impl Into<String>,
        target_page_id: impl Into<String>,
        context: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_page_id: source_page_id.into(),
            source_page_title: source_page_title.into(),
            target_page_id: target_page_id.into(),
            created_at: Utc::now(),
            context,
        }
    }
}

/// Backlink resolved to its full source page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklinkRecord {
    pub source_page: PageRecord,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub is_bidirectional: bool,
    pub created_at: DateTime<Utc>,
}

/// A reference found in page text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedLink {
    pub source_page_id: String,
    pub target_page_id: String,
    pub context: String,
}
