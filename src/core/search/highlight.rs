//! Highlight snippet selection.
//!
//! Fragments arrive already marked up by the index and are passed
//! through untouched.

use crate::core::index::{RawHit, HIGHLIGHT_FIELD};

/// Default number of fragments kept per hit
pub const DEFAULT_MAX_FRAGMENTS: usize = 2;

/// Picks displayable abstract fragments from raw hits
#[derive(Debug, Clone, Copy)]
pub struct ResultHighlighter {
    max_fragments: usize,
}

impl Default for ResultHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAGMENTS)
    }
}

impl ResultHighlighter {
    pub fn new(max_fragments: usize) -> Self {
        Self { max_fragments }
    }

    /// First fragments for the abstract field, in index order.
    ///
    /// Empty when the index returned no highlight for the abstract.
    pub fn highlight(&self, hit: &RawHit) -> Vec<String> {
        hit.highlight
            .as_ref()
            .and_then(|fields| fields.get(HIGHLIGHT_FIELD))
            .map(|fragments| {
                fragments
                    .iter()
                    .take(self.max_fragments)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
