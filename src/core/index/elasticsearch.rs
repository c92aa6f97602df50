//! Elasticsearch transport.
//!
//! Renders [`IndexRequest`]s as query DSL and posts them to
//! `{url}/{index}/_search`. Elasticsearch only knows `search_after`, so
//! a `search_before` bound is sent as `search_after` together with the
//! already reversed sort of a backward scan.

use super::{
    Catalog, CatalogBucket, IndexQueryService, IndexRequest, IndexResponse, RawHit,
};
use crate::core::config::IndexConfig;
use crate::core::error::{Result, SearchError};
use crate::core::search::{QueryExpression, SortKey};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// Keyword field holding institution names in the institutions index
const INSTITUTION_NAME_FIELD: &str = "international.display_name.en.keyword";

/// Largest terms aggregation the cluster accepts
const MAX_CATALOG_BUCKETS: usize = 65_536;

/// Elasticsearch-backed index and catalog
pub struct ElasticsearchIndex {
    client: Client,
    base_url: String,
    institutions_index: String,
    institution_prefix: String,
}

impl ElasticsearchIndex {
    /// Create a client for the configured cluster
    pub fn new(config: &IndexConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            institutions_index: config.institutions_index.clone(),
            institution_prefix: config.institution_prefix.clone(),
        })
    }

    /// Query DSL for an expression
    pub fn query_dsl(expression: &QueryExpression) -> Result<Value> {
        match expression {
            QueryExpression::Match { field, value } => Ok(json!({ "match": { field.path(): value } })),
            QueryExpression::Term { field, value } => {
                Ok(json!({ "term": { field.keyword_path(): value } }))
            }
            QueryExpression::BoolMust { subclauses } => {
                let must = subclauses
                    .iter()
                    .map(Self::query_dsl)
                    .collect::<Result<Vec<_>>>()?;
                Ok(json!({ "bool": { "must": must } }))
            }
            QueryExpression::Empty => Err(SearchError::InvalidQuery(
                "Empty query cannot be executed".to_string(),
            )),
        }
    }

    /// Full `_search` request body
    pub fn request_body(request: &IndexRequest) -> Result<Value> {
        let sort: Vec<Value> = request
            .sort
            .iter()
            .map(|clause| json!({ clause.field.as_str(): { "order": clause.order.as_str() } }))
            .collect();

        let highlight_fields: Map<String, Value> = request
            .highlight
            .fields
            .iter()
            .map(|(field, tags)| {
                (
                    field.clone(),
                    json!({ "pre_tags": [tags.pre_tag], "post_tags": [tags.post_tag] }),
                )
            })
            .collect();

        let mut body = json!({
            "query": Self::query_dsl(&request.query)?,
            "size": request.size,
            "track_total_hits": request.track_total_hits,
            "sort": sort,
            "_source": request.source_fields,
        });

        if !highlight_fields.is_empty() {
            body["highlight"] = json!({ "fields": highlight_fields });
        }

        if let Some(boundary) = request.search_after.as_ref().or(request.search_before.as_ref()) {
            body["search_after"] = json!([boundary.relevance_score, boundary.tie_break_id]);
        }

        Ok(body)
    }

    /// Parse a `_search` response body
    pub fn parse_response(body: &Value) -> Result<IndexResponse> {
        let hits = body
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .ok_or_else(|| SearchError::InvalidResponse("missing hits.hits".to_string()))?;

        let hits = hits.iter().map(Self::parse_hit).collect::<Result<Vec<_>>>()?;

        // `hits.total` is an object since 7.0, a bare number before
        let total_hits = match body.pointer("/hits/total") {
            Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
            Some(total) => total.as_u64(),
            None => None,
        };

        Ok(IndexResponse { hits, total_hits })
    }

    fn parse_hit(hit: &Value) -> Result<RawHit> {
        let id = hit
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| SearchError::InvalidResponse("hit without _id".to_string()))?
            .to_string();

        let sort_key = match hit.get("sort").and_then(Value::as_array) {
            Some(values) if values.len() >= 2 => {
                let score = values[0].as_f64().ok_or_else(|| {
                    SearchError::InvalidResponse(format!("non-numeric score in sort of {id}"))
                })?;
                let tie_break = match &values[1] {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                SortKey::new(score, tie_break)
            }
            _ => {
                let score = hit.get("_score").and_then(Value::as_f64).unwrap_or(0.0);
                SortKey::new(score, id.clone())
            }
        };

        let highlight = hit
            .get("highlight")
            .and_then(Value::as_object)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(field, fragments)| {
                        let fragments = fragments
                            .as_array()
                            .into_iter()
                            .flatten()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect();
                        (field.clone(), fragments)
                    })
                    .collect::<BTreeMap<String, Vec<String>>>()
            });

        Ok(RawHit {
            id,
            source: hit.get("_source").cloned().unwrap_or(Value::Null),
            sort_key,
            highlight,
        })
    }

    /// Aggregation body listing institution names
    pub fn catalog_body(prefix: &str) -> Value {
        json!({
            "size": 0,
            "query": { "prefix": { INSTITUTION_NAME_FIELD: prefix } },
            "aggs": {
                "unique_institutions": {
                    "terms": { "field": INSTITUTION_NAME_FIELD, "size": MAX_CATALOG_BUCKETS }
                }
            }
        })
    }

    /// Parse the institution aggregation buckets
    pub fn parse_catalog(body: &Value) -> Result<Vec<CatalogBucket>> {
        let buckets = body
            .pointer("/aggregations/unique_institutions/buckets")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SearchError::InvalidResponse("missing unique_institutions buckets".to_string())
            })?;

        Ok(buckets
            .iter()
            .filter_map(|bucket| {
                Some(CatalogBucket {
                    key: bucket.get("key")?.as_str()?.to_string(),
                    count: bucket.get("doc_count")?.as_u64()?,
                })
            })
            .collect())
    }

    async fn post(&self, index: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/{}/_search", self.base_url, index);
        tracing::debug!(%url, "POST _search");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Transport(format!("{status}: {text}")));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl IndexQueryService for ElasticsearchIndex {
    async fn search(&self, request: IndexRequest) -> Result<IndexResponse> {
        let body = Self::request_body(&request)?;
        let response = self.post(&request.index, &body).await?;
        Self::parse_response(&response)
    }
}

#[async_trait]
impl Catalog for ElasticsearchIndex {
    async fn aggregate(&self) -> Result<Vec<CatalogBucket>> {
        let body = Self::catalog_body(&self.institution_prefix);
        let response = self.post(&self.institutions_index, &body).await?;
        Self::parse_catalog(&response)
    }
}
