//! Sort keys and keyset pagination cursors.
//!
//! Results are ranked by relevance descending, then by a unique
//! tie-break id ascending. That ordering is total, so a single
//! [`SortKey`] is enough to resume a scan in either direction.

use crate::core::error::{Result, SearchError};
use crate::core::index::{SortClause, SortOrder, SCORE_FIELD};
use crate::core::types::SearchResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Position of a result in the ranking.
///
/// `Ord` follows the ranking: a key that is displayed earlier compares
/// as `Less`. Scores use IEEE total ordering so NaN cannot break it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortKey {
    pub relevance_score: f64,
    pub tie_break_id: String,
}

impl SortKey {
    pub fn new(relevance_score: f64, tie_break_id: impl Into<String>) -> Self {
        Self {
            relevance_score,
            tie_break_id: tie_break_id.into(),
        }
    }

    /// Compare on a single sort clause
    fn cmp_on(&self, other: &Self, clause: &SortClause) -> Ordering {
        let natural = if clause.is_score() {
            self.relevance_score.total_cmp(&other.relevance_score)
        } else {
            self.tie_break_id.cmp(&other.tie_break_id)
        };
        match clause.order {
            SortOrder::Asc => natural,
            SortOrder::Desc => natural.reverse(),
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .relevance_score
            .total_cmp(&self.relevance_score)
            .then_with(|| self.tie_break_id.cmp(&other.tie_break_id))
    }
}

/// Order two keys by an explicit sort specification.
///
/// Clauses on `_score` compare the relevance score, every other
/// field compares the tie-break id.
pub fn compare_by(sort: &[SortClause], a: &SortKey, b: &SortKey) -> Ordering {
    sort.iter()
        .map(|clause| a.cmp_on(b, clause))
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Scan direction relative to the ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Sort specification for a scan in this direction
    pub fn sort(self, tie_break_field: &str) -> Vec<SortClause> {
        let forward = vec![
            SortClause::new(SCORE_FIELD, SortOrder::Desc),
            SortClause::new(tie_break_field, SortOrder::Asc),
        ];
        match self {
            Direction::Forward => forward,
            Direction::Backward => forward
                .into_iter()
                .map(|c| SortClause::new(c.field, c.order.reversed()))
                .collect(),
        }
    }
}

/// Boundary from which a keyset scan resumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    pub boundary_sort_key: SortKey,
    pub direction: Direction,
}

impl PaginationCursor {
    pub fn forward(boundary_sort_key: SortKey) -> Self {
        Self {
            boundary_sort_key,
            direction: Direction::Forward,
        }
    }

    pub fn backward(boundary_sort_key: SortKey) -> Self {
        Self {
            boundary_sort_key,
            direction: Direction::Backward,
        }
    }

    /// Forward cursor anchored on the last result of a window
    pub fn after_window(window: &[SearchResult]) -> Result<Self> {
        window
            .last()
            .map(|r| Self::forward(r.sort_key.clone()))
            .ok_or_else(|| {
                SearchError::CursorUnavailable("window is empty, no last sort key".to_string())
            })
    }

    /// Backward cursor anchored on the first result of a window
    pub fn before_window(window: &[SearchResult]) -> Result<Self> {
        window
            .first()
            .map(|r| Self::backward(r.sort_key.clone()))
            .ok_or_else(|| {
                SearchError::CursorUnavailable("window is empty, no first sort key".to_string())
            })
    }

    /// `(search_after, search_before)` request parameters
    pub fn request_bounds(&self) -> (Option<SortKey>, Option<SortKey>) {
        match self.direction {
            Direction::Forward => (Some(self.boundary_sort_key.clone()), None),
            Direction::Backward => (None, Some(self.boundary_sort_key.clone())),
        }
    }
}
