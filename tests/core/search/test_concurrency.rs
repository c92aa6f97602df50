// Integration tests for in-flight guards, cancellation and deadlines

use crate::common::{wait_for_phase, ScriptedIndex};
use scholar_search::core::error::SearchError;
use scholar_search::core::search::{Phase, SearchSession, SessionSettings};
use scholar_search::core::types::FilterCriteria;
use std::sync::Arc;
use std::time::Duration;

fn shared_session(count: usize) -> (Arc<SearchSession>, Arc<ScriptedIndex>) {
    let index = Arc::new(ScriptedIndex::new(count));
    let session = Arc::new(SearchSession::new(index.clone(), SessionSettings::default()));
    (session, index)
}

fn neural_networks() -> FilterCriteria {
    FilterCriteria::new().with_search_term("neural networks")
}

#[tokio::test]
async fn test_operations_rejected_while_loading() {
    let (session, index) = shared_session(25);
    index.hold();

    let task = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.search(neural_networks()).await })
    };
    wait_for_phase(&session, Phase::Loading).await;

    let during = session.navigate_next().await.unwrap();
    assert_eq!(during.phase, Phase::Loading);
    let during = session
        .search(FilterCriteria::new().with_author("Hinton"))
        .await
        .unwrap();
    assert_eq!(during.phase, Phase::Loading);
    assert_eq!(index.request_count(), 1);

    index.release(1);
    let state = task.await.unwrap().unwrap();
    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(state.criteria, neural_networks());
    assert_eq!(state.total_hits, 25);
}

#[tokio::test]
async fn test_cancelled_search_response_is_discarded() {
    let (session, index) = shared_session(25);
    index.hold();

    let task = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.search(neural_networks()).await })
    };
    wait_for_phase(&session, Phase::Loading).await;

    let cancelled = session.cancel();
    assert_eq!(cancelled.phase, Phase::Idle);

    index.release(1);
    let late = task.await.unwrap().unwrap();
    assert_eq!(late.phase, Phase::Idle);
    assert!(late.window.is_empty());
    assert_eq!(session.state().total_hits, 0);

    // The session accepts new work right away
    index.release(1);
    let state = session.search(neural_networks()).await.unwrap();
    assert_eq!(state.phase, Phase::Ready);
}

#[tokio::test]
async fn test_cancelled_navigation_keeps_current_page() {
    let (session, index) = shared_session(25);
    let first = session.search(neural_networks()).await.unwrap();
    index.hold();

    let task = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.navigate_next().await })
    };
    wait_for_phase(&session, Phase::Loading).await;

    let cancelled = session.cancel();
    assert_eq!(cancelled.phase, Phase::Ready);
    assert_eq!(cancelled.window, first.window);

    index.release(1);
    task.await.unwrap().unwrap();

    let state = session.state();
    assert_eq!(state.page_index, 1);
    assert_eq!(state.window, first.window);
    assert!(state.history.is_empty());
}

#[tokio::test]
async fn test_aborted_task_leaves_loading() {
    let (session, index) = shared_session(25);
    session.search(neural_networks()).await.unwrap();
    index.hold();

    let task = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.navigate_next().await })
    };
    wait_for_phase(&session, Phase::Loading).await;

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    let state = session.state();
    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(state.page_index, 1);
}

#[tokio::test]
async fn test_request_timeout_fails_session() {
    let index = Arc::new(ScriptedIndex::new(25));
    let settings = SessionSettings {
        request_timeout: Duration::from_millis(50),
        ..SessionSettings::default()
    };
    let session = SearchSession::new(index.clone(), settings);
    index.hold();

    let err = session.search(neural_networks()).await.unwrap_err();
    assert!(matches!(err, SearchError::Timeout(50)));
    assert!(err.is_transport());

    let state = session.state();
    assert_eq!(state.phase, Phase::Failed);
    assert!(state.last_error.is_some());
}

#[tokio::test]
async fn test_sessions_do_not_share_state() {
    let index = Arc::new(ScriptedIndex::new(25));
    let a = SearchSession::new(index.clone(), SessionSettings::default());
    let b = SearchSession::new(index.clone(), SessionSettings::default());

    a.search(neural_networks()).await.unwrap();
    a.navigate_next().await.unwrap();

    assert_eq!(a.state().page_index, 2);
    assert_eq!(b.state().phase, Phase::Idle);
    assert_eq!(b.state().page_index, 1);
}
