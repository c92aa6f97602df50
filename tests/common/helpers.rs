// Test helper functions

use async_trait::async_trait;
use scholar_search::core::config::Config;
use scholar_search::core::error::{Result, SearchError};
use scholar_search::core::index::{IndexQueryService, IndexRequest, IndexResponse, RawHit};
use scholar_search::core::search::{compare_by, Phase, SearchSession, SortKey};
use scholar_search::core::services::Services;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

/// Create services over an in-process index of `works`
#[allow(dead_code)] // Used in integration tests
pub fn create_test_services(works: &[Value]) -> Services {
    Services::with_local(Config::default(), works).expect("Failed to build local index")
}

/// Yield until the session reaches `phase`
#[allow(dead_code)] // Used in integration tests
pub async fn wait_for_phase(session: &SearchSession, phase: Phase) {
    for _ in 0..10_000 {
        if session.state().phase == phase {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("session never reached {phase:?}");
}

/// Index double serving a fixed ranked list.
///
/// Honors sort, `search_after`/`search_before` and `track_total_hits` the
/// way a keyset-capable index does. Can be made to fail, or to hold
/// requests until released, and records every request it receives.
#[allow(dead_code)]
pub struct ScriptedIndex {
    keys: Vec<SortKey>,
    fail: AtomicBool,
    gated: AtomicBool,
    gate: Semaphore,
    requests: Mutex<Vec<IndexRequest>>,
}

#[allow(dead_code)]
impl ScriptedIndex {
    /// `count` documents; scores drop every three documents so ties
    /// are broken by id
    pub fn new(count: usize) -> Self {
        let keys = (0..count)
            .map(|i| SortKey::new(50.0 - (i / 3) as f64, format!("W{:04}", 9999 - i)))
            .collect();
        Self::with_keys(keys)
    }

    pub fn with_keys(keys: Vec<SortKey>) -> Self {
        Self {
            keys,
            fail: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Make subsequent requests fail with a transport error
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Hold subsequent requests until `release` is called
    pub fn hold(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    /// Let `n` held requests proceed
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Most recent request
    pub fn last_request(&self) -> IndexRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request received")
    }
}

#[async_trait]
impl IndexQueryService for ScriptedIndex {
    async fn search(&self, request: IndexRequest) -> Result<IndexResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if self.gated.load(Ordering::SeqCst) {
            self.gate
                .acquire()
                .await
                .map_err(|e| SearchError::Transport(e.to_string()))?
                .forget();
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(SearchError::Transport("connection refused".to_string()));
        }

        let mut keys = self.keys.clone();
        keys.sort_by(|a, b| compare_by(&request.sort, a, b));

        // A backward scan arrives with the sort already reversed
        let boundary = request.search_after.as_ref().or(request.search_before.as_ref());
        let hits = keys
            .into_iter()
            .filter(|k| boundary.map_or(true, |b| compare_by(&request.sort, k, b).is_gt()))
            .take(request.size)
            .map(|key| RawHit {
                id: key.tie_break_id.clone(),
                source: json!({
                    "display_name": format!("Work {}", key.tie_break_id),
                    "abstract": "plain abstract text",
                }),
                highlight: Some(
                    [(
                        "abstract".to_string(),
                        vec![
                            "first <mark>neural</mark> fragment".to_string(),
                            "second <mark>neural</mark> fragment".to_string(),
                            "third <mark>neural</mark> fragment".to_string(),
                        ],
                    )]
                    .into_iter()
                    .collect(),
                ),
                sort_key: key,
            })
            .collect();

        Ok(IndexResponse {
            hits,
            total_hits: request.track_total_hits.then_some(self.keys.len() as u64),
        })
    }
}

/// Index double that reports a total but returns no hits
#[allow(dead_code)] // Used in integration tests
pub struct HitlessIndex {
    total_hits: u64,
    requests: Mutex<usize>,
}

#[allow(dead_code)] // Used in integration tests
impl HitlessIndex {
    pub fn new(total_hits: u64) -> Self {
        Self {
            total_hits,
            requests: Mutex::new(0),
        }
    }

    pub fn request_count(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

#[async_trait]
impl IndexQueryService for HitlessIndex {
    async fn search(&self, request: IndexRequest) -> Result<IndexResponse> {
        *self.requests.lock().unwrap() += 1;
        Ok(IndexResponse {
            hits: Vec::new(),
            total_hits: request.track_total_hits.then_some(self.total_hits),
        })
    }
}
