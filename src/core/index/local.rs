//! In-process index backed by Tantivy.
//!
//! Holds OpenAlex work documents in a RAM index and serves the same
//! request/response surface as the Elasticsearch transport: BM25
//! relevance, keyset bounds, total hit counting, abstract highlighting
//! and source filtering. Used for fixtures and tests.

use super::{
    Catalog, CatalogBucket, IndexQueryService, IndexRequest, IndexResponse, RawHit,
    HIGHLIGHT_FIELD,
};
use crate::core::error::{Result, SearchError};
use crate::core::search::{compare_by, QueryExpression, SearchField, SortKey};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, EmptyQuery, Occur, Query, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, Value as TantivyValue, STORED, STRING, TEXT,
};
use tantivy::snippet::{Snippet, SnippetGenerator};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, IndexReader, IndexWriter, TantivyDocument, Term};

/// Characters per highlight fragment
const FRAGMENT_CHARS: usize = 150;

/// Create the Tantivy schema for works
///
/// Fields:
/// - id: Document identifier (STRING | STORED)
/// - abstract: Abstract text (TEXT | STORED, needed for snippets)
/// - authors: Author names, one value per authorship (TEXT)
/// - institutions: Institution names (TEXT)
/// - institutions_keyword: Institution names, untokenized (STRING)
/// - source: Original document as JSON (STORED)
pub fn create_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_text_field("id", STRING | STORED);
    builder.add_text_field("abstract", TEXT | STORED);
    builder.add_text_field("authors", TEXT);
    builder.add_text_field("institutions", TEXT);
    builder.add_text_field("institutions_keyword", STRING);
    builder.add_text_field("source", STORED);

    builder.build()
}

struct Fields {
    id: Field,
    abstract_text: Field,
    authors: Field,
    institutions: Field,
    institutions_keyword: Field,
    source: Field,
}

impl Fields {
    fn from_schema(schema: &Schema) -> Result<Self> {
        let get = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| SearchError::IndexError(format!("Missing {name} field: {e}")))
        };
        Ok(Self {
            id: get("id")?,
            abstract_text: get("abstract")?,
            authors: get("authors")?,
            institutions: get("institutions")?,
            institutions_keyword: get("institutions_keyword")?,
            source: get("source")?,
        })
    }

    fn analyzed(&self, field: SearchField) -> Field {
        match field {
            SearchField::Abstract => self.abstract_text,
            SearchField::Authors => self.authors,
            SearchField::Institutions => self.institutions,
        }
    }

    fn exact(&self, field: SearchField) -> Option<Field> {
        match field {
            SearchField::Institutions => Some(self.institutions_keyword),
            SearchField::Abstract | SearchField::Authors => None,
        }
    }
}

/// Author names of a work in authorship order
fn work_authors(work: &Value) -> Vec<&str> {
    work.get("authorships")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|a| a.pointer("/author/display_name").and_then(Value::as_str))
        .collect()
}

/// Distinct institution names of a work
fn work_institutions(work: &Value) -> BTreeSet<&str> {
    work.get("authorships")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|a| a.get("institutions").and_then(Value::as_array))
        .flatten()
        .filter_map(|i| i.get("display_name").and_then(Value::as_str))
        .collect()
}

/// Wrap highlighted ranges of a snippet in tags
fn render_snippet(snippet: &Snippet, pre_tag: &str, post_tag: &str) -> String {
    let fragment = snippet.fragment();
    let mut ranges = snippet.highlighted().to_vec();
    ranges.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(fragment.len() + ranges.len() * 16);
    let mut cursor = 0;
    for range in ranges {
        if range.start < cursor || range.end > fragment.len() {
            continue;
        }
        out.push_str(&fragment[cursor..range.start]);
        out.push_str(pre_tag);
        out.push_str(&fragment[range.clone()]);
        out.push_str(post_tag);
        cursor = range.end;
    }
    out.push_str(&fragment[cursor..]);
    out
}

/// Tantivy RAM index over work documents
pub struct LocalIndex {
    index: Index,
    reader: IndexReader,
    fields: Fields,
    institutions: Vec<CatalogBucket>,
}

impl std::fmt::Debug for LocalIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIndex")
            .field("docs", &self.reader.searcher().num_docs())
            .finish()
    }
}

impl LocalIndex {
    /// Index the given works (each needs a string `id`)
    pub fn from_works(works: &[Value]) -> Result<Self> {
        let schema = create_schema();
        let fields = Fields::from_schema(&schema)?;
        let index = Index::create_in_ram(schema);

        let mut writer: IndexWriter = index.writer_with_num_threads(1, 50_000_000)?;
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();

        for work in works {
            let id = work.get("id").and_then(Value::as_str).ok_or_else(|| {
                SearchError::IndexError("Work without a string id".to_string())
            })?;

            let mut doc = TantivyDocument::default();
            doc.add_text(fields.id, id);
            if let Some(text) = work.get("abstract").and_then(Value::as_str) {
                doc.add_text(fields.abstract_text, text);
            }
            for author in work_authors(work) {
                doc.add_text(fields.authors, author);
            }
            for institution in work_institutions(work) {
                doc.add_text(fields.institutions, institution);
                doc.add_text(fields.institutions_keyword, institution);
                *counts.entry(institution.to_string()).or_default() += 1;
            }
            doc.add_text(fields.source, serde_json::to_string(work)?);

            writer.add_document(doc)?;
        }
        writer.commit()?;

        let reader = index.reader()?;

        let mut institutions: Vec<CatalogBucket> = counts
            .into_iter()
            .map(|(key, count)| CatalogBucket { key, count })
            .collect();
        institutions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));

        tracing::debug!("Local index built with {} work(s)", works.len());

        Ok(Self {
            index,
            reader,
            fields,
            institutions,
        })
    }

    /// Number of indexed works
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Tokenize `text` with the field's analyzer into search terms
    fn analyze(&self, field: Field, text: &str) -> Result<Vec<Term>> {
        let mut analyzer = self.index.tokenizer_for_field(field)?;
        let mut terms: Vec<Term> = Vec::new();
        let mut stream = analyzer.token_stream(text);
        stream.process(&mut |token| {
            let term = Term::from_field_text(field, &token.text);
            if !terms.contains(&term) {
                terms.push(term);
            }
        });
        Ok(terms)
    }

    fn to_query(&self, expression: &QueryExpression) -> Result<Box<dyn Query>> {
        match expression {
            QueryExpression::Match { field, value } => {
                let terms = self.analyze(self.fields.analyzed(*field), value)?;
                if terms.is_empty() {
                    return Ok(Box::new(EmptyQuery));
                }
                let clauses = terms
                    .into_iter()
                    .map(|term| {
                        let query: Box<dyn Query> =
                            Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                        (Occur::Should, query)
                    })
                    .collect();
                Ok(Box::new(BooleanQuery::new(clauses)))
            }
            QueryExpression::Term { field, value } => {
                let exact = self.fields.exact(*field).ok_or_else(|| {
                    SearchError::InvalidQuery(format!(
                        "Exact match is not supported on {}",
                        field.path()
                    ))
                })?;
                Ok(Box::new(TermQuery::new(
                    Term::from_field_text(exact, value),
                    IndexRecordOption::Basic,
                )))
            }
            QueryExpression::BoolMust { subclauses } => {
                if subclauses.is_empty() {
                    return Ok(Box::new(EmptyQuery));
                }
                let clauses = subclauses
                    .iter()
                    .map(|sub| Ok((Occur::Must, self.to_query(sub)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Box::new(BooleanQuery::new(clauses)))
            }
            QueryExpression::Empty => Err(SearchError::InvalidQuery(
                "Empty query cannot be executed".to_string(),
            )),
        }
    }

    fn execute(&self, request: &IndexRequest) -> Result<IndexResponse> {
        let query = self.to_query(&request.query)?;
        let searcher = self.reader.searcher();

        let limit = (searcher.num_docs() as usize).max(1);
        let (top_docs, count) = searcher.search(&*query, &(TopDocs::with_limit(limit), Count))?;

        let mut candidates: Vec<(SortKey, TantivyDocument)> = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let id = doc
                .get_first(self.fields.id)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            candidates.push((SortKey::new(f64::from(score), id), doc));
        }

        if let Some(after) = &request.search_after {
            candidates.retain(|(key, _)| compare_by(&request.sort, key, after).is_gt());
        }
        if let Some(before) = &request.search_before {
            candidates.retain(|(key, _)| key < before);
        }
        candidates.sort_by(|(a, _), (b, _)| compare_by(&request.sort, a, b));
        candidates.truncate(request.size);

        let highlighter = match request.highlight.fields.get(HIGHLIGHT_FIELD) {
            Some(tags) => {
                let mut generator =
                    SnippetGenerator::create(&searcher, &*query, self.fields.abstract_text)?;
                generator.set_max_num_chars(FRAGMENT_CHARS);
                Some((generator, tags))
            }
            None => None,
        };

        let mut hits = Vec::with_capacity(candidates.len());
        for (sort_key, doc) in candidates {
            let source = self.source_of(&doc, &request.source_fields)?;

            let highlight = highlighter.as_ref().and_then(|(generator, tags)| {
                let snippet = generator.snippet_from_doc(&doc);
                if snippet.highlighted().is_empty() {
                    return None;
                }
                let fragment = render_snippet(&snippet, &tags.pre_tag, &tags.post_tag);
                let mut fields = BTreeMap::new();
                fields.insert(HIGHLIGHT_FIELD.to_string(), vec![fragment]);
                Some(fields)
            });

            hits.push(RawHit {
                id: sort_key.tie_break_id.clone(),
                source,
                sort_key,
                highlight,
            });
        }

        Ok(IndexResponse {
            hits,
            total_hits: request.track_total_hits.then_some(count as u64),
        })
    }

    /// Stored source restricted to the requested fields
    fn source_of(&self, doc: &TantivyDocument, source_fields: &[String]) -> Result<Value> {
        let raw = doc
            .get_first(self.fields.source)
            .and_then(|v| v.as_str())
            .unwrap_or("{}");
        let source: Value = serde_json::from_str(raw)?;

        if source_fields.is_empty() {
            return Ok(source);
        }
        let filtered: Map<String, Value> = match source {
            Value::Object(object) => object
                .into_iter()
                .filter(|(key, _)| source_fields.iter().any(|f| f == key))
                .collect(),
            _ => Map::new(),
        };
        Ok(Value::Object(filtered))
    }
}

#[async_trait]
impl IndexQueryService for LocalIndex {
    async fn search(&self, request: IndexRequest) -> Result<IndexResponse> {
        self.execute(&request)
    }
}

#[async_trait]
impl Catalog for LocalIndex {
    async fn aggregate(&self) -> Result<Vec<CatalogBucket>> {
        Ok(self.institutions.clone())
    }
}
