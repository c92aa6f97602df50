//! CLI test helpers
//!
//! Provides Arc<Services> wrappers matching CLI execute() signatures.

use crate::common::{create_test_services, WorksCorpus};
use scholar_search::cli::commands::search::SearchArgs;
use scholar_search::core::services::Services;
use std::sync::Arc;

/// Services over the neural networks corpus, wrapped in Arc
pub fn create_cli_test_services() -> Arc<Services> {
    Arc::new(create_test_services(&WorksCorpus::neural_networks().works()))
}

/// Search arguments for an abstract term
pub fn abstract_search(term: &str) -> SearchArgs {
    SearchArgs {
        search_term: Some(term.to_string()),
        pages: 1,
        ..SearchArgs::default()
    }
}
