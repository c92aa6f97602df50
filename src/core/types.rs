//! Core data types for scholar-search.
//!
//! Filter input supplied by the caller and the display-ready result
//! records produced from raw index hits.

use crate::core::index::RawHit;
use crate::core::search::SortKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Optional filters entered by the user.
///
/// A field that is `None` or whitespace-only counts as blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free text matched against abstracts
    #[serde(default)]
    pub search_term: Option<String>,

    /// Free text matched against author names
    #[serde(default)]
    pub author_name: Option<String>,

    /// Institution name picked from the catalog
    #[serde(default)]
    pub institution_name: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author_name = Some(author.into());
        self
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution_name = Some(institution.into());
        self
    }

    /// Trimmed search term, if not blank
    pub fn search_term(&self) -> Option<&str> {
        non_blank(&self.search_term)
    }

    /// Trimmed author name, if not blank
    pub fn author_name(&self) -> Option<&str> {
        non_blank(&self.author_name)
    }

    /// Trimmed institution name, if not blank
    pub fn institution_name(&self) -> Option<&str> {
        non_blank(&self.institution_name)
    }

    /// True when every field is blank
    pub fn is_blank(&self) -> bool {
        self.search_term().is_none()
            && self.author_name().is_none()
            && self.institution_name().is_none()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// A work ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document identifier
    pub id: String,

    /// Title of the work
    pub display_name: String,

    pub publication_date: Option<NaiveDate>,

    pub doi: Option<String>,

    /// Author names in authorship order
    pub authors: Vec<String>,

    /// Highlighted abstract fragments (already marked up by the index)
    pub highlight_snippets: Vec<String>,

    /// Plain abstract, shown when there are no snippets
    pub abstract_text: Option<String>,

    /// Position of this result in the ranking
    pub sort_key: SortKey,
}

impl SearchResult {
    /// Build a result from a raw hit and its highlight fragments.
    ///
    /// The hit source follows the OpenAlex work layout
    /// (`display_name`, `publication_date`, `ids.doi`, `authorships[].author.display_name`).
    pub fn from_hit(hit: &RawHit, highlight_snippets: Vec<String>) -> Self {
        let source = &hit.source;

        let authors = source
            .get("authorships")
            .and_then(Value::as_array)
            .map(|authorships| {
                authorships
                    .iter()
                    .filter_map(|a| a.pointer("/author/display_name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: hit.id.clone(),
            display_name: string_field(source, "/display_name").unwrap_or_default(),
            publication_date: string_field(source, "/publication_date")
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            doi: string_field(source, "/ids/doi"),
            authors,
            highlight_snippets,
            abstract_text: string_field(source, "/abstract"),
            sort_key: hit.sort_key.clone(),
        }
    }

    /// Snippets to display, falling back to the plain abstract
    pub fn display_snippets(&self) -> Vec<&str> {
        if !self.highlight_snippets.is_empty() {
            return self.highlight_snippets.iter().map(String::as_str).collect();
        }
        self.abstract_text.as_deref().into_iter().collect()
    }
}

fn string_field(source: &Value, pointer: &str) -> Option<String> {
    source
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}
