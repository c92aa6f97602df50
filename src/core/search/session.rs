//! Search session state machine with keyset pagination.
//!
//! A [`SearchSession`] owns one [`SessionState`] and mutates it only
//! through `search`, `navigate_next`, `navigate_previous` and `cancel`.
//! Each operation performs at most one round trip to the injected
//! [`IndexQueryService`] and returns a snapshot of the resulting state.
//!
//! # Phases
//!
//! ```text
//! Idle ──search──> Loading ──ok──> Ready ──search/navigate──> Loading
//!                     │
//!                     └──err──> Failed ──search──> Loading
//! ```
//!
//! While a request is in flight every operation is a no-op. Requests are
//! stamped with a generation number; a response whose generation is no
//! longer current (after `cancel`) is discarded.
//!
//! # Cursor stack
//!
//! `navigate_next` pushes a backward cursor anchored on the first result
//! of the page it loads; `navigate_previous` pops it and scans backward
//! from that boundary, which yields exactly the page that was left.

use crate::core::config::Config;
use crate::core::error::{Result, SearchError};
use crate::core::index::{HighlightSpec, IndexQueryService, IndexRequest, IndexResponse, SOURCE_FIELDS};
use crate::core::search::cursor::{Direction, PaginationCursor};
use crate::core::search::highlight::ResultHighlighter;
use crate::core::search::query::{self, QueryExpression};
use crate::core::types::{FilterCriteria, SearchResult};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Snapshot of everything the UI needs to render a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub phase: Phase,
    /// Criteria of the last successful search
    pub criteria: FilterCriteria,
    /// Current page, in ranking order
    pub window: Vec<SearchResult>,
    /// 1-based page number
    pub page_index: usize,
    pub page_size: usize,
    pub total_hits: u64,
    pub total_pages: usize,
    /// Round-trip time of the last completed request
    pub elapsed_millis: f64,
    /// Cursors for backward navigation, most recent last
    pub history: Vec<PaginationCursor>,
    /// Failure that moved the session into `Failed`
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn new(page_size: usize) -> Self {
        Self {
            phase: Phase::Idle,
            criteria: FilterCriteria::default(),
            window: Vec::new(),
            page_index: 1,
            page_size,
            total_hits: 0,
            total_pages: 0,
            elapsed_millis: 0.0,
            history: Vec::new(),
            last_error: None,
        }
    }

    /// Whether `navigate_next` would issue a request
    pub fn has_next(&self) -> bool {
        self.phase == Phase::Ready && self.page_index < self.total_pages
    }

    /// Whether `navigate_previous` would issue a request
    pub fn has_previous(&self) -> bool {
        self.phase == Phase::Ready && self.page_index > 1
    }

    fn window_is_ordered(&self) -> bool {
        self.window
            .windows(2)
            .all(|pair| pair[0].sort_key <= pair[1].sort_key)
    }
}

/// `ceil(total_hits / page_size)`
pub fn total_pages(total_hits: u64, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_hits.div_ceil(page_size as u64) as usize
}

/// Per-session request parameters
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub index: String,
    pub page_size: usize,
    pub tie_break_field: String,
    pub highlight: HighlightSpec,
    pub max_fragments: usize,
    pub request_timeout: Duration,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            index: config.index.works_index.clone(),
            page_size: config.search.page_size,
            tie_break_field: config.index.tie_break_field.clone(),
            highlight: HighlightSpec::abstract_field(
                config.search.highlight_pre_tag.clone(),
                config.search.highlight_post_tag.clone(),
            ),
            max_fragments: config.search.max_fragments,
            request_timeout: Duration::from_millis(config.limits.request_timeout_ms),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

struct Inner {
    state: SessionState,
    /// Stamp of the most recently issued request
    generation: u64,
    /// Phase to return to if the in-flight request is abandoned
    resume_phase: Phase,
}

impl Inner {
    /// Enter `Loading` and stamp a new generation
    fn begin(&mut self, resume_phase: Phase) -> u64 {
        self.generation += 1;
        self.resume_phase = resume_phase;
        self.state.phase = Phase::Loading;
        self.generation
    }
}

/// What a completed request does to the state
enum Step {
    Fresh(FilterCriteria),
    Next,
    Previous,
}

/// Restores the pre-`Loading` phase if the operation future is dropped
struct InFlight<'a> {
    session: &'a SearchSession,
    generation: u64,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.session.lock();
        if inner.generation == self.generation && inner.state.phase == Phase::Loading {
            inner.state.phase = inner.resume_phase;
            tracing::debug!(
                generation = self.generation,
                "Request abandoned, restored {:?}",
                inner.resume_phase
            );
        }
    }
}

/// Stateful orchestrator of one user's search interaction
pub struct SearchSession {
    service: Arc<dyn IndexQueryService>,
    settings: SessionSettings,
    highlighter: ResultHighlighter,
    inner: Mutex<Inner>,
}

impl SearchSession {
    pub fn new(service: Arc<dyn IndexQueryService>, settings: SessionSettings) -> Self {
        let highlighter = ResultHighlighter::new(settings.max_fragments);
        let state = SessionState::new(settings.page_size);
        Self {
            service,
            settings,
            highlighter,
            inner: Mutex::new(Inner {
                state,
                generation: 0,
                resume_phase: Phase::Idle,
            }),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Run a fresh search for page 1.
    ///
    /// All-blank criteria return [`SearchError::EmptyQueryNotExecuted`]
    /// without touching the state. A transport failure moves the session
    /// to `Failed` and is also returned.
    pub async fn search(&self, criteria: FilterCriteria) -> Result<SessionState> {
        let query = query::build(&criteria);
        if query.is_empty() {
            tracing::debug!("All filters blank, search not executed");
            return Err(SearchError::EmptyQueryNotExecuted);
        }

        let generation = {
            let mut inner = self.lock();
            if inner.state.phase == Phase::Loading {
                tracing::debug!("Search rejected: request already in flight");
                return Ok(inner.state.clone());
            }
            let state = &mut inner.state;
            state.window.clear();
            state.history.clear();
            state.page_index = 1;
            state.total_hits = 0;
            state.total_pages = 0;
            // Discarded results cannot be resumed
            inner.begin(Phase::Idle)
        };
        let guard = self.in_flight(generation);

        tracing::info!(generation, "Searching {:?}", query);
        let request = self.request(query, Direction::Forward, None, true);
        let (outcome, elapsed_millis) = self.round_trip(request).await;

        self.complete(guard, outcome, elapsed_millis, Step::Fresh(criteria))
    }

    /// Load the page after the current window.
    ///
    /// No-op unless the session is `Ready` and not on the last page.
    pub async fn navigate_next(&self) -> Result<SessionState> {
        let (generation, request) = {
            let mut inner = self.lock();
            if !inner.state.has_next() {
                tracing::debug!(
                    phase = ?inner.state.phase,
                    page = inner.state.page_index,
                    "navigate_next ignored"
                );
                return Ok(inner.state.clone());
            }

            let cursor = match PaginationCursor::after_window(&inner.state.window) {
                Ok(cursor) => cursor,
                Err(e) => {
                    tracing::error!(page = inner.state.page_index, "Ready session without results: {e}");
                    return Err(e);
                }
            };

            let query = query::build(&inner.state.criteria);
            let request = self.request(query, Direction::Forward, Some(&cursor), false);
            (inner.begin(Phase::Ready), request)
        };
        let guard = self.in_flight(generation);

        tracing::debug!(generation, "Fetching next page");
        let (outcome, elapsed_millis) = self.round_trip(request).await;

        self.complete(guard, outcome, elapsed_millis, Step::Next)
    }

    /// Reload the page before the current window.
    ///
    /// No-op unless the session is `Ready` and past the first page.
    pub async fn navigate_previous(&self) -> Result<SessionState> {
        let (generation, request) = {
            let mut inner = self.lock();
            if !inner.state.has_previous() {
                tracing::debug!(
                    phase = ?inner.state.phase,
                    page = inner.state.page_index,
                    "navigate_previous ignored"
                );
                return Ok(inner.state.clone());
            }

            let cursor = match inner.state.history.last() {
                Some(cursor) => cursor.clone(),
                None => {
                    let e = SearchError::CursorUnavailable(format!(
                        "no history cursor on page {}",
                        inner.state.page_index
                    ));
                    tracing::error!("{e}");
                    return Err(e);
                }
            };

            let query = query::build(&inner.state.criteria);
            let request = self.request(query, Direction::Backward, Some(&cursor), false);
            (inner.begin(Phase::Ready), request)
        };
        let guard = self.in_flight(generation);

        tracing::debug!(generation, "Fetching previous page");
        let (outcome, elapsed_millis) = self.round_trip(request).await;

        self.complete(guard, outcome, elapsed_millis, Step::Previous)
    }

    /// Abandon the in-flight request, if any.
    ///
    /// The phase returns to what it was before `Loading`; the late
    /// response will be discarded.
    pub fn cancel(&self) -> SessionState {
        let mut inner = self.lock();
        if inner.state.phase == Phase::Loading {
            inner.generation += 1;
            inner.state.phase = inner.resume_phase;
            tracing::info!(
                generation = inner.generation,
                "In-flight request cancelled, back to {:?}",
                inner.resume_phase
            );
        }
        inner.state.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State stays consistent across a poisoned lock: every mutation
        // happens in a single critical section.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn in_flight(&self, generation: u64) -> InFlight<'_> {
        InFlight {
            session: self,
            generation,
            armed: true,
        }
    }

    fn request(
        &self,
        query: QueryExpression,
        direction: Direction,
        cursor: Option<&PaginationCursor>,
        track_total_hits: bool,
    ) -> IndexRequest {
        let (search_after, search_before) = cursor
            .map(PaginationCursor::request_bounds)
            .unwrap_or((None, None));

        IndexRequest {
            index: self.settings.index.clone(),
            query,
            size: self.settings.page_size,
            track_total_hits,
            sort: direction.sort(&self.settings.tie_break_field),
            search_after,
            search_before,
            highlight: self.settings.highlight.clone(),
            source_fields: SOURCE_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    async fn round_trip(&self, request: IndexRequest) -> (Result<IndexResponse>, f64) {
        let start = Instant::now();
        let timeout = self.settings.request_timeout;

        let outcome = match tokio::time::timeout(timeout, self.service.search(request)).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout(timeout.as_millis() as u64)),
        };

        (outcome, start.elapsed().as_secs_f64() * 1000.0)
    }

    fn complete(
        &self,
        guard: InFlight<'_>,
        outcome: Result<IndexResponse>,
        elapsed_millis: f64,
        step: Step,
    ) -> Result<SessionState> {
        let generation = guard.generation;
        guard.disarm();

        let mut inner = self.lock();
        if inner.generation != generation || inner.state.phase != Phase::Loading {
            tracing::debug!(
                generation,
                current = inner.generation,
                "Discarding stale response"
            );
            return Ok(inner.state.clone());
        }

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(generation, "Search request failed: {e}");
                inner.state.phase = Phase::Failed;
                inner.state.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let mut results: Vec<SearchResult> = response
            .hits
            .iter()
            .take(self.settings.page_size)
            .map(|hit| SearchResult::from_hit(hit, self.highlighter.highlight(hit)))
            .collect();

        let state = &mut inner.state;
        match step {
            Step::Fresh(criteria) => {
                let total_hits = response.total_hits.unwrap_or_else(|| {
                    tracing::warn!("Index omitted total hits, using page length");
                    results.len() as u64
                });
                state.criteria = criteria;
                state.window = results;
                state.history.clear();
                state.page_index = 1;
                state.total_hits = total_hits;
                state.total_pages = total_pages(total_hits, state.page_size);
            }
            Step::Next => match PaginationCursor::before_window(&results) {
                Ok(cursor) => {
                    state.history.push(cursor);
                    state.window = results;
                    state.page_index += 1;
                }
                Err(_) => {
                    tracing::warn!(
                        page = state.page_index,
                        "Index returned no results past the current page"
                    );
                }
            },
            Step::Previous => {
                if results.is_empty() {
                    tracing::warn!(
                        page = state.page_index,
                        "Index returned no results before the current page"
                    );
                } else {
                    results.reverse();
                    state.history.pop();
                    state.window = results;
                    state.page_index -= 1;
                }
            }
        }

        state.phase = Phase::Ready;
        state.elapsed_millis = elapsed_millis;
        state.last_error = None;
        debug_assert!(state.window_is_ordered(), "window out of ranking order");

        tracing::info!(
            page = state.page_index,
            total_pages = state.total_pages,
            total_hits = state.total_hits,
            results = state.window.len(),
            "Session ready ({:.1}ms)",
            elapsed_millis
        );

        Ok(state.clone())
    }
}
