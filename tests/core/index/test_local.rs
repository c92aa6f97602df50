// Integration tests: sessions over the local Tantivy index

use crate::common::fixtures::{HINTON_WORKS, NEURAL_WORKS};
use crate::common::{create_test_services, WorksCorpus};
use scholar_search::core::index::filter_buckets;
use scholar_search::core::search::Phase;
use scholar_search::core::types::FilterCriteria;
use std::collections::HashSet;

fn neural_networks() -> FilterCriteria {
    FilterCriteria::new().with_search_term("neural networks")
}

#[tokio::test]
async fn test_abstract_search_pages() {
    let services = create_test_services(&WorksCorpus::neural_networks().works());
    let session = services.create_session();

    let first = session.search(neural_networks()).await.unwrap();
    assert_eq!(first.phase, Phase::Ready);
    assert_eq!(first.total_hits, NEURAL_WORKS as u64);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.window.len(), 10);

    let second = session.navigate_next().await.unwrap();
    assert_eq!(second.page_index, 2);
    assert!(second.window[0].sort_key > first.window.last().unwrap().sort_key);

    let third = session.navigate_next().await.unwrap();
    assert_eq!(third.window.len(), 5);

    let mut ids: HashSet<String> = HashSet::new();
    for state in [&first, &second, &third] {
        ids.extend(state.window.iter().map(|r| r.id.clone()));
    }
    assert_eq!(ids.len(), NEURAL_WORKS);

    assert_eq!(session.navigate_previous().await.unwrap().window, second.window);
    assert_eq!(session.navigate_previous().await.unwrap().window, first.window);
}

#[tokio::test]
async fn test_equal_scores_break_ties_by_id() {
    let services = create_test_services(&WorksCorpus::neural_networks().works());
    let session = services.create_session();
    let state = session.search(neural_networks()).await.unwrap();

    for pair in state.window.windows(2) {
        let (a, b) = (&pair[0].sort_key, &pair[1].sort_key);
        assert!(a.relevance_score >= b.relevance_score);
        if a.relevance_score == b.relevance_score {
            assert!(a.tie_break_id < b.tie_break_id);
        }
    }
}

#[tokio::test]
async fn test_results_carry_highlights() {
    let services = create_test_services(&WorksCorpus::neural_networks().works());
    let session = services.create_session();
    let state = session.search(neural_networks()).await.unwrap();

    for result in &state.window {
        assert!(!result.highlight_snippets.is_empty());
        assert!(result.highlight_snippets.len() <= 2);
        assert!(result.highlight_snippets[0].contains("<mark>"));
        assert!(result.display_name.starts_with("Neural study"));
        assert!(result.doi.is_some());
        assert!(result.publication_date.is_some());
        assert!(!result.authors.is_empty());
    }
}

#[tokio::test]
async fn test_author_search_falls_back_to_abstract() {
    let services = create_test_services(&WorksCorpus::neural_networks().works());
    let session = services.create_session();

    let state = session
        .search(FilterCriteria::new().with_author("Hinton"))
        .await
        .unwrap();

    assert_eq!(state.total_hits, HINTON_WORKS as u64);
    for result in &state.window {
        assert!(result.highlight_snippets.is_empty());
        assert_eq!(result.display_snippets().len(), 1);
        assert!(result.authors.contains(&"Geoffrey Hinton".to_string()));
    }
}

#[tokio::test]
async fn test_institution_alone_is_exact() {
    let services = create_test_services(&WorksCorpus::neural_networks().works());
    let session = services.create_session();

    let exact = session
        .search(FilterCriteria::new().with_institution("University of Toronto"))
        .await
        .unwrap();
    assert_eq!(exact.total_hits, HINTON_WORKS as u64);

    let partial = session
        .search(FilterCriteria::new().with_institution("Toronto"))
        .await
        .unwrap();
    assert_eq!(partial.total_hits, 0);
    assert_eq!(partial.phase, Phase::Ready);
}

#[tokio::test]
async fn test_combined_filters_must_all_match() {
    let services = create_test_services(&WorksCorpus::neural_networks().works());
    let session = services.create_session();

    let state = session
        .search(
            FilterCriteria::new()
                .with_search_term("neural")
                .with_author("Bengio")
                .with_institution("Montreal"),
        )
        .await
        .unwrap();

    // Every 4th of the 25 neural works adds Bengio
    assert_eq!(state.total_hits, 7);
    assert_eq!(state.total_pages, 1);
}

#[tokio::test]
async fn test_catalog_counts_institutions() {
    let services = create_test_services(&WorksCorpus::neural_networks().works());
    let buckets = services.catalog.aggregate().await.unwrap();

    let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "New York University",
            "University of Montreal",
            "University of Cambridge",
            "University of Toronto",
        ]
    );
    assert_eq!(buckets[0].count, 20);
    assert_eq!(buckets[1].count, 7);

    let universities = filter_buckets(&buckets, "university of");
    assert_eq!(universities.len(), 3);
}
