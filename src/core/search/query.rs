//! Query construction from filter criteria.
//!
//! Free-text filters become analyzed `Match` clauses. An institution
//! on its own becomes an exact `Term` clause because its value comes
//! from the pre-aggregated catalog, not from free text. When more than
//! one filter is set they are joined in a `BoolMust` conjunction in
//! the fixed order abstract, authors, institutions.

use crate::core::types::FilterCriteria;
use serde::{Deserialize, Serialize};

/// Logical document fields addressed by filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Abstract,
    Authors,
    Institutions,
}

impl SearchField {
    /// Analyzed field path in the works index
    pub fn path(self) -> &'static str {
        match self {
            SearchField::Abstract => "abstract",
            SearchField::Authors => "authorships.author.display_name",
            SearchField::Institutions => "authorships.institutions.display_name",
        }
    }

    /// Non-analyzed sub-field used for exact matching
    pub fn keyword_path(self) -> String {
        format!("{}.keyword", self.path())
    }
}

/// Structured query tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryExpression {
    /// Analyzed text match
    Match { field: SearchField, value: String },
    /// Exact value match
    Term { field: SearchField, value: String },
    /// Every subclause must match
    BoolMust { subclauses: Vec<QueryExpression> },
    /// Nothing to execute
    Empty,
}

impl QueryExpression {
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryExpression::Empty)
    }

    fn matching(field: SearchField, value: &str) -> Self {
        QueryExpression::Match {
            field,
            value: value.to_string(),
        }
    }
}

/// Map filter criteria to a query expression.
///
/// Blank fields are ignored; all-blank criteria yield
/// [`QueryExpression::Empty`], never an implicit match-all.
pub fn build(criteria: &FilterCriteria) -> QueryExpression {
    use QueryExpression as Q;
    use SearchField::*;

    match (
        criteria.search_term(),
        criteria.author_name(),
        criteria.institution_name(),
    ) {
        (None, None, None) => Q::Empty,
        (Some(term), None, None) => Q::matching(Abstract, term),
        (None, Some(author), None) => Q::matching(Authors, author),
        (None, None, Some(institution)) => Q::Term {
            field: Institutions,
            value: institution.to_string(),
        },
        (term, author, institution) => {
            let subclauses = [
                term.map(|v| Q::matching(Abstract, v)),
                author.map(|v| Q::matching(Authors, v)),
                institution.map(|v| Q::matching(Institutions, v)),
            ]
            .into_iter()
            .flatten()
            .collect();
            Q::BoolMust { subclauses }
        }
    }
}
