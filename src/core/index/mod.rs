//! Index access layer.
//!
//! The session engine talks to the document index only through the
//! [`IndexQueryService`] trait. Two backends are provided:
//!
//! - **elasticsearch**: HTTP transport to an Elasticsearch cluster
//! - **local**: in-process Tantivy index over OpenAlex work documents
//!
//! Institution suggestions come from a separate [`Catalog`] collaborator.

mod elasticsearch;
mod local;
pub mod openalex;

pub use elasticsearch::ElasticsearchIndex;
pub use local::LocalIndex;

use crate::core::error::Result;
use crate::core::search::{QueryExpression, SortKey};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Pseudo-field addressing the relevance score in sort clauses
pub const SCORE_FIELD: &str = "_score";

/// Field whose highlight fragments are requested
pub const HIGHLIGHT_FIELD: &str = "abstract";

/// Source fields needed to render a result
pub const SOURCE_FIELDS: [&str; 5] = [
    "display_name",
    "publication_date",
    "ids",
    "authorships",
    "abstract",
];

/// Sort direction of a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One `{field, order}` entry of the sort specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    pub order: SortOrder,
}

impl SortClause {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// True if this clause orders by relevance score
    pub fn is_score(&self) -> bool {
        self.field == SCORE_FIELD
    }
}

/// Markup wrapped around highlighted terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightTags {
    pub pre_tag: String,
    pub post_tag: String,
}

/// Highlight request: per-field tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpec {
    pub fields: BTreeMap<String, HighlightTags>,
}

impl HighlightSpec {
    /// Highlight the abstract field with the given tags
    pub fn abstract_field(pre_tag: impl Into<String>, post_tag: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            HIGHLIGHT_FIELD.to_string(),
            HighlightTags {
                pre_tag: pre_tag.into(),
                post_tag: post_tag.into(),
            },
        );
        Self { fields }
    }
}

/// A search request sent to the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRequest {
    pub index: String,
    pub query: QueryExpression,
    pub size: usize,
    pub track_total_hits: bool,
    pub sort: Vec<SortClause>,
    /// Return hits ranked strictly after this key in `sort` order
    pub search_after: Option<SortKey>,
    /// Return hits ranked strictly before this key in forward order
    pub search_before: Option<SortKey>,
    pub highlight: HighlightSpec,
    pub source_fields: Vec<String>,
}

/// A single hit as returned by the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    pub id: String,
    pub source: Value,
    pub sort_key: SortKey,
    /// Highlight fragments per field
    pub highlight: Option<BTreeMap<String, Vec<String>>>,
}

/// Response to an [`IndexRequest`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexResponse {
    pub hits: Vec<RawHit>,
    /// Present only when `track_total_hits` was requested
    pub total_hits: Option<u64>,
}

/// Request/response query surface of the document index
#[async_trait]
pub trait IndexQueryService: Send + Sync {
    /// Execute one search round trip
    async fn search(&self, request: IndexRequest) -> Result<IndexResponse>;
}

/// Distinct value with its document count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBucket {
    pub key: String,
    pub count: u64,
}

/// Source of the institution names offered as filter suggestions
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Distinct institution names ordered by descending count
    async fn aggregate(&self) -> Result<Vec<CatalogBucket>>;
}

/// Keep buckets whose key contains `needle` (case-insensitive)
pub fn filter_buckets<'a>(buckets: &'a [CatalogBucket], needle: &str) -> Vec<&'a CatalogBucket> {
    let needle = needle.to_lowercase();
    buckets
        .iter()
        .filter(|b| b.key.to_lowercase().contains(&needle))
        .collect()
}
