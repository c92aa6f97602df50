// Integration tests for loading OpenAlex works files

use crate::common::fixtures::NEURAL_WORKS;
use crate::common::WorksCorpus;
use scholar_search::core::index::openalex::{load_works, parse_works};
use scholar_search::core::index::LocalIndex;
use serde_json::json;

#[test]
fn test_load_jsonl_reconstructs_abstracts() {
    let corpus = WorksCorpus::neural_networks();
    let (_dir, path) = corpus.write_jsonl();

    let works = load_works(&path).unwrap();
    assert_eq!(works.len(), NEURAL_WORKS + 5);

    // Work 0 was stored as an inverted index
    assert_eq!(works[0]["abstract"], "neural networks learn representations");
    assert!(works[0].get("abstract_inverted_index").is_none());
    assert_eq!(works, corpus.works());
}

#[test]
fn test_load_missing_file() {
    let err = load_works("/nonexistent/works.jsonl").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/works.jsonl"));
}

#[test]
fn test_works_without_id_are_skipped() {
    let contents = serde_json::to_string(&json!([
        { "id": "https://openalex.org/W1", "abstract": "kept" },
        { "display_name": "no id" }
    ]))
    .unwrap();

    let works = parse_works(&contents).unwrap();
    assert_eq!(works.len(), 1);

    let index = LocalIndex::from_works(&works).unwrap();
    assert_eq!(index.num_docs(), 1);
}
