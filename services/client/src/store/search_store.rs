//! services/client/src/store/search_store.rs
//!
//! The search state container consumed by the UI layer.
//!
//! It owns the current query, the paging cursor and the visible results, and
//! sequences "search then replace" and "load more then append". Each
//! submission takes a sequence number; a response is only applied when its
//! number is still the latest one issued, so an overtaken search can never
//! overwrite a newer one.

use crate::error::{ClientError, ClientResult};
use crate::services::{SearchOutcome, SearchService};
use academic_search_core::domain::{
    AnswerRecord, ResultRecord, SearchFilters, SearchMode, SearchQuery, SortOrder,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

//=========================================================================================
// State Types
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
    Ready,
    Failed,
}

/// What the UI shows. Document lists and generated answers never coexist.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultView {
    #[default]
    Empty,
    Documents {
        records: Vec<ResultRecord>,
        total: u64,
        has_more: bool,
    },
    Answer(AnswerRecord),
    /// Answer mode finished but produced no answer.
    NoAnswer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub mode: SearchMode,
    pub query: SearchQuery,
    pub phase: SearchPhase,
    pub view: ResultView,
    /// The message to surface, if any.
    pub error: Option<String>,
    /// The query (including its page) behind the documents in `view`.
    pub results_query: Option<SearchQuery>,
}

impl SearchState {
    pub fn records(&self) -> &[ResultRecord] {
        match &self.view {
            ResultView::Documents { records, .. } => records,
            _ => &[],
        }
    }

    pub fn answer(&self) -> Option<&AnswerRecord> {
        match &self.view {
            ResultView::Answer(answer) => Some(answer),
            _ => None,
        }
    }

    pub fn total(&self) -> u64 {
        match &self.view {
            ResultView::Documents { total, .. } => *total,
            _ => 0,
        }
    }

    /// More pages exist for the documents shown, and they still answer the
    /// current query. Editing the text, filters or sort turns this off until
    /// the next search.
    pub fn has_more(&self) -> bool {
        let current = self
            .results_query
            .as_ref()
            .is_some_and(|shown| shown.same_criteria(&self.query));
        current && matches!(self.view, ResultView::Documents { has_more: true, .. })
    }
}

/// How a submission ended from the store's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The response was applied to the state.
    Applied,
    /// A newer submission was issued meanwhile; the response was dropped.
    Superseded,
    /// Nothing was sent.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Apply {
    Replace,
    Append,
}

fn has_more(page: u32, page_size: u32, total: u64) -> bool {
    u64::from(page) * u64::from(page_size) < total
}

//=========================================================================================
// SearchStore
//=========================================================================================

pub struct SearchStore {
    search: SearchService,
    min_query_length: usize,
    state: Mutex<SearchState>,
    latest: AtomicU64,
}

impl SearchStore {
    pub fn new(search: SearchService, min_query_length: usize, page_size: u32) -> Self {
        Self {
            search,
            min_query_length,
            state: Mutex::new(SearchState {
                mode: SearchMode::default(),
                query: SearchQuery::new("", page_size.max(1)),
                phase: SearchPhase::Idle,
                view: ResultView::Empty,
                error: None,
                results_query: None,
            }),
            latest: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> SearchState {
        self.state.lock().await.clone()
    }

    /// Issues a new sequence number, invalidating anything in flight.
    fn next_sequence(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    // --- Mutations (no network) ---

    /// Switches mode; results from the previous mode are dropped.
    pub async fn set_mode(&self, mode: SearchMode) {
        let mut state = self.state.lock().await;
        self.next_sequence();
        state.mode = mode;
        state.query.page = 1;
        state.view = ResultView::Empty;
        state.results_query = None;
        state.phase = SearchPhase::Idle;
        state.error = None;
    }

    pub async fn set_query(&self, text: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.query.text = text.into();
        state.query.page = 1;
    }

    pub async fn set_filters(&self, filters: SearchFilters) {
        let mut state = self.state.lock().await;
        state.query.filters = filters;
        state.query.page = 1;
    }

    pub async fn set_sort(&self, sort_by: Option<String>, sort_order: Option<SortOrder>) {
        let mut state = self.state.lock().await;
        state.query.sort_by = sort_by;
        state.query.sort_order = sort_order;
        state.query.page = 1;
    }

    pub async fn clear_results(&self) {
        let mut state = self.state.lock().await;
        self.next_sequence();
        state.query.page = 1;
        state.view = ResultView::Empty;
        state.results_query = None;
        state.phase = SearchPhase::Idle;
        state.error = None;
    }

    // --- Submissions ---

    /// Submits the current query, replacing whatever is shown.
    pub async fn perform_search(&self) -> ClientResult<Submission> {
        let (sequence, mode, query) = {
            let mut state = self.state.lock().await;

            if state.query.text.chars().count() < self.min_query_length {
                let message = format!(
                    "Please enter at least {} characters to search",
                    self.min_query_length
                );
                state.error = Some(message.clone());
                return Err(ClientError::Validation(message));
            }

            let sequence = self.next_sequence();
            state.query.page = 1;
            state.phase = SearchPhase::Searching;
            state.view = ResultView::Empty;
            state.results_query = None;
            state.error = None;
            (sequence, state.mode, state.query.clone())
        };

        info!("Search #{} ({}) for '{}'", sequence, mode, query.text);
        self.run(sequence, mode, query, Apply::Replace).await
    }

    /// Re-submits the current query after a failure.
    pub async fn retry(&self) -> ClientResult<Submission> {
        self.perform_search().await
    }

    /// Fetches the next page and appends it. A no-op unless the state is
    /// `Ready` in a list mode with more results available.
    pub async fn load_more(&self) -> ClientResult<Submission> {
        let (sequence, mode, query) = {
            let mut state = self.state.lock().await;

            let eligible =
                state.phase == SearchPhase::Ready && !state.mode.is_answer() && state.has_more();
            let shown_page = match (&state.results_query, eligible) {
                (Some(shown), true) => shown.page,
                _ => return Ok(Submission::Skipped),
            };

            let sequence = self.next_sequence();
            state.query.page = shown_page + 1;
            state.phase = SearchPhase::Searching;
            state.error = None;
            (sequence, state.mode, state.query.clone())
        };

        debug!("Search #{} loads page {}", sequence, query.page);
        self.run(sequence, mode, query, Apply::Append).await
    }

    async fn run(
        &self,
        sequence: u64,
        mode: SearchMode,
        query: SearchQuery,
        apply: Apply,
    ) -> ClientResult<Submission> {
        let outcome = self.search.search(mode, &query).await;

        let mut state = self.state.lock().await;
        if self.latest.load(Ordering::SeqCst) != sequence {
            debug!("Dropping response of superseded search #{}", sequence);
            return Ok(Submission::Superseded);
        }

        match outcome {
            Ok(SearchOutcome::Page(page)) => {
                let records = match (apply, std::mem::take(&mut state.view)) {
                    (Apply::Append, ResultView::Documents { mut records, .. }) => {
                        records.extend(page.records);
                        records
                    }
                    _ => page.records,
                };
                state.view = ResultView::Documents {
                    records,
                    total: page.total,
                    has_more: has_more(query.page, query.page_size, page.total),
                };
                state.results_query = Some(query);
                state.error = None;
            }
            Ok(SearchOutcome::Answer(Some(answer))) => {
                state.view = ResultView::Answer(answer);
                state.results_query = None;
                state.error = None;
            }
            Ok(SearchOutcome::Answer(None)) => {
                state.view = ResultView::NoAnswer;
                state.results_query = None;
                state.error = Some(ClientError::NoAnswerAvailable.to_string());
            }
            Err(e) => {
                warn!("Search #{} failed: {}", sequence, e);
                state.phase = SearchPhase::Failed;
                state.view = ResultView::Empty;
                state.results_query = None;
                state.error = Some(e.to_string());
                return Err(e);
            }
        }

        state.phase = SearchPhase::Ready;
        Ok(Submission::Applied)
    }
}
