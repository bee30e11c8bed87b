//! Search session: the view-model behind the discover screen.
//!
//! The session owns the user's current inputs (category, free text, radius,
//! origin) and the last published result list. Every input change starts a new
//! aggregation run on the tokio runtime; completed runs come back over an
//! unbounded channel and are applied by [`SearchSession::poll_completed`] or
//! [`SearchSession::wait_idle`], always from the task that owns the session.
//!
//! # Sequencing
//!
//! Each run carries a token from a monotonically increasing counter. A
//! completion is applied only if its token is the latest one issued, so an
//! older run that finishes late is computed and then discarded. `is_loading`
//! is true exactly while the latest run has not been applied.

use crate::{
    aggregator::{SearchAggregator, DEFAULT_MAX_RESULTS},
    category::{expand, Category},
    types::{Coordinate, Place},
};
use tokio::{runtime::Handle, sync::mpsc};
use tracing::{debug, warn};

pub const MIN_RADIUS_KM: u32 = 1;
pub const MAX_RADIUS_KM: u32 = 50;
pub const DEFAULT_RADIUS_KM: u32 = 2;

/// Result of one finished aggregation run.
#[derive(Debug)]
pub struct RunOutcome {
    pub token: u64,
    pub places: Vec<Place>,
}

pub struct SearchSession {
    aggregator: SearchAggregator,
    runtime: Handle,

    category: Category,
    free_text: String,
    radius_km: u32,
    origin: Option<Coordinate>,
    max_results: usize,

    results: Vec<Place>,
    is_loading: bool,
    latest_token: u64,

    completed_tx: mpsc::UnboundedSender<RunOutcome>,
    completed_rx: mpsc::UnboundedReceiver<RunOutcome>,
}

impl SearchSession {
    /// Create an idle session. No run starts until an input changes or
    /// [`refresh`](Self::refresh) is called.
    pub fn new(aggregator: SearchAggregator, runtime: Handle) -> Self {
        let (completed_tx, completed_rx) = mpsc::unbounded_channel();
        Self {
            aggregator,
            runtime,
            category: Category::default(),
            free_text: String::new(),
            radius_km: DEFAULT_RADIUS_KM,
            origin: None,
            max_results: DEFAULT_MAX_RESULTS,
            results: Vec::new(),
            is_loading: false,
            latest_token: 0,
            completed_tx,
            completed_rx,
        }
    }

    pub fn with_origin(mut self, origin: Option<Coordinate>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_radius_km(mut self, radius_km: u32) -> Self {
        self.radius_km = clamp_radius(radius_km);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    // -- Accessors ----------------------------------------------------------

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    pub fn radius_km(&self) -> u32 {
        self.radius_km
    }

    pub fn origin(&self) -> Option<Coordinate> {
        self.origin
    }

    pub fn results(&self) -> &[Place] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Token of the most recently started run (0 before the first run).
    pub fn latest_token(&self) -> u64 {
        self.latest_token
    }

    // -- Inputs -------------------------------------------------------------

    /// Select a category and start a new run. Returns the run's token.
    pub fn set_category(&mut self, category: Category) -> u64 {
        self.category = category;
        self.start_run()
    }

    /// Replace the free text used by [`Category::Other`] and start a new run.
    pub fn set_free_text(&mut self, text: impl Into<String>) -> u64 {
        self.free_text = text.into();
        self.start_run()
    }

    /// Switch to [`Category::Other`] with `text` as the free text, starting a
    /// single run for both changes.
    pub fn search_custom(&mut self, text: impl Into<String>) -> u64 {
        self.category = Category::Other;
        self.free_text = text.into();
        self.start_run()
    }

    /// Set the radius (clamped to 1–50 km) and start a new run.
    pub fn set_radius_km(&mut self, radius_km: u32) -> u64 {
        self.radius_km = clamp_radius(radius_km);
        self.start_run()
    }

    /// Update the search origin (e.g. a new location fix) and start a new run.
    pub fn set_origin(&mut self, origin: Option<Coordinate>) -> u64 {
        self.origin = origin;
        self.start_run()
    }

    /// Re-run the search with the current inputs.
    pub fn refresh(&mut self) -> u64 {
        self.start_run()
    }

    // -- Completion ---------------------------------------------------------

    /// Apply every completion that has already arrived, without waiting.
    /// Returns true if the published state changed.
    pub fn poll_completed(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.completed_rx.try_recv() {
            changed |= self.apply(outcome);
        }
        changed
    }

    /// Wait until the latest run has been applied. Stale completions received
    /// along the way are discarded.
    pub async fn wait_idle(&mut self) {
        while self.is_loading {
            match self.completed_rx.recv().await {
                Some(outcome) => {
                    self.apply(outcome);
                }
                // Unreachable while `self` holds a sender.
                None => break,
            }
        }
    }

    fn start_run(&mut self) -> u64 {
        self.latest_token += 1;
        let token = self.latest_token;

        let queries = expand(self.category, Some(&self.free_text));
        if queries.is_empty() {
            debug!(token, category = %self.category, "nothing to search, clearing results");
            self.results.clear();
            self.is_loading = false;
            return token;
        }

        self.is_loading = true;
        let aggregator = self.aggregator.clone();
        let tx = self.completed_tx.clone();
        let origin = self.origin;
        let radius_meters = f64::from(self.radius_km) * 1000.0;
        let max_results = self.max_results;
        debug!(
            token,
            category = %self.category,
            radius_km = self.radius_km,
            has_origin = origin.is_some(),
            "starting search run"
        );

        let run = self.runtime.spawn(async move {
            aggregator
                .run_category(&queries, origin, radius_meters, max_results)
                .await
        });
        self.runtime.spawn(async move {
            // A run that panicked still completes, with no results.
            let places = run.await.unwrap_or_else(|err| {
                warn!(token, error = %err, "search run aborted, publishing no results");
                Vec::new()
            });
            // The receiver is gone only if the session was dropped.
            let _ = tx.send(RunOutcome { token, places });
        });

        token
    }

    fn apply(&mut self, outcome: RunOutcome) -> bool {
        if outcome.token != self.latest_token {
            debug!(
                token = outcome.token,
                latest = self.latest_token,
                "discarding stale search results"
            );
            return false;
        }
        debug!(token = outcome.token, results = outcome.places.len(), "publishing search results");
        self.results = outcome.places;
        self.is_loading = false;
        true
    }
}

fn clamp_radius(radius_km: u32) -> u32 {
    radius_km.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::LookupError,
        places::PlacesLookup,
        types::{LocationBias, PlaceDetail},
    };
    use async_trait::async_trait;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    /// Every query returns one id named after the query.
    #[derive(Default)]
    struct EchoLookup {
        searches: AtomicUsize,
    }

    #[async_trait]
    impl PlacesLookup for EchoLookup {
        async fn search(
            &self,
            query: &str,
            _bias: Option<LocationBias>,
        ) -> Result<Vec<String>, LookupError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![query.to_string()])
        }

        async fn fetch_detail(&self, id: &str) -> Result<Option<PlaceDetail>, LookupError> {
            Ok(Some(PlaceDetail {
                id: id.to_string(),
                name: id.to_string(),
                formatted_address: None,
                coordinate: Coordinate::new(0.0, 0.0),
            }))
        }
    }

    /// Panics while resolving any detail.
    struct PanickingLookup;

    #[async_trait]
    impl PlacesLookup for PanickingLookup {
        async fn search(
            &self,
            query: &str,
            _bias: Option<LocationBias>,
        ) -> Result<Vec<String>, LookupError> {
            Ok(vec![query.to_string()])
        }

        async fn fetch_detail(&self, _id: &str) -> Result<Option<PlaceDetail>, LookupError> {
            panic!("provider bug");
        }
    }

    fn session(lookup: Arc<EchoLookup>) -> SearchSession {
        SearchSession::new(SearchAggregator::new(lookup), Handle::current())
    }

    #[tokio::test]
    async fn radius_is_clamped() {
        let mut s = session(Arc::default());
        s.set_radius_km(0);
        assert_eq!(s.radius_km(), MIN_RADIUS_KM);
        s.set_radius_km(500);
        assert_eq!(s.radius_km(), MAX_RADIUS_KM);
        s.set_radius_km(7);
        assert_eq!(s.radius_km(), 7);
    }

    #[tokio::test]
    async fn loading_until_applied() {
        let mut s = session(Arc::default());
        s.set_category(Category::Food);
        assert!(s.is_loading());
        s.wait_idle().await;
        assert!(!s.is_loading());
        assert_eq!(s.results().len(), 3);
    }

    #[tokio::test]
    async fn blank_other_clears_without_searching() {
        let lookup = Arc::new(EchoLookup::default());
        let mut s = session(lookup.clone());
        s.set_category(Category::All);
        s.wait_idle().await;
        assert!(!s.results().is_empty());
        let before = lookup.searches.load(Ordering::SeqCst);

        s.set_category(Category::Other);
        assert!(!s.is_loading());
        assert!(s.results().is_empty());
        assert_eq!(lookup.searches.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn custom_search_is_one_run() {
        let lookup = Arc::new(EchoLookup::default());
        let mut s = session(lookup.clone());
        let token = s.search_custom("  red cross ");
        assert_eq!(token, 1);
        assert_eq!(s.category(), Category::Other);
        s.wait_idle().await;
        let ids: Vec<&str> = s.results().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["red cross", "red cross near me"]);
        assert_eq!(lookup.searches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn panicking_run_still_clears_loading() {
        let mut s = SearchSession::new(SearchAggregator::new(Arc::new(PanickingLookup)), Handle::current());
        s.set_category(Category::Food);
        assert!(s.is_loading());
        s.wait_idle().await;
        assert!(!s.is_loading());
        assert!(s.results().is_empty());
    }

    #[tokio::test]
    async fn tokens_increase_per_input_change() {
        let mut s = session(Arc::default());
        let a = s.set_category(Category::Health);
        let b = s.set_radius_km(10);
        let c = s.set_free_text("ignored for health");
        assert!(a < b && b < c);
        assert_eq!(s.latest_token(), c);
        s.wait_idle().await;
    }
}
