//! Scripted in-process [`PlacesLookup`] for aggregator and session harnesses.
//!
//! Each query and each identifier is scripted up front with a result and an
//! optional delay. Unknown queries return no candidates and unknown ids
//! return `Ok(None)`. Every call is recorded so harnesses can assert on
//! fan-out, biasing and call counts.
//!
//! ```rust
//! let fake = ScriptedLookup::new()
//!     .query("food bank near me", &["X", "Y"])
//!     .query_err("pantry", LookupError::Timeout)
//!     .place(detail_at("X", 3_000.0))
//!     .into_arc();
//! ```

use async_trait::async_trait;
use cdm_core::{LocationBias, LookupError, PlaceDetail, PlacesLookup};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Scripted<T> = (Result<T, LookupError>, Option<Duration>);

#[derive(Default)]
pub struct ScriptedLookup {
    searches: HashMap<String, Scripted<Vec<String>>>,
    details: HashMap<String, Scripted<Option<PlaceDetail>>>,
    search_log: Mutex<Vec<(String, Option<LocationBias>)>>,
    detail_log: Mutex<Vec<String>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// `query` returns `ids` immediately.
    pub fn query(mut self, query: &str, ids: &[&str]) -> Self {
        self.searches.insert(query.to_string(), (Ok(to_ids(ids)), None));
        self
    }

    /// `query` returns `ids` after `delay`.
    pub fn query_after(mut self, query: &str, ids: &[&str], delay: Duration) -> Self {
        self.searches.insert(query.to_string(), (Ok(to_ids(ids)), Some(delay)));
        self
    }

    pub fn query_err(mut self, query: &str, err: LookupError) -> Self {
        self.searches.insert(query.to_string(), (Err(err), None));
        self
    }

    /// Resolve `detail.id` to `detail`.
    pub fn place(self, detail: PlaceDetail) -> Self {
        let id = detail.id.clone();
        self.resolve(&id, detail)
    }

    pub fn places(self, details: impl IntoIterator<Item = PlaceDetail>) -> Self {
        details.into_iter().fold(self, Self::place)
    }

    /// Resolve the requested `id` to `detail`, whose own id may differ.
    pub fn resolve(mut self, id: &str, detail: PlaceDetail) -> Self {
        self.details.insert(id.to_string(), (Ok(Some(detail)), None));
        self
    }

    pub fn detail_err(mut self, id: &str, err: LookupError) -> Self {
        self.details.insert(id.to_string(), (Err(err), None));
        self
    }

    // -- Recorded calls -----------------------------------------------------

    /// Queries searched, in call order.
    pub fn searched(&self) -> Vec<String> {
        self.search_log.lock().unwrap().iter().map(|(q, _)| q.clone()).collect()
    }

    /// Bias passed with each search, in call order.
    pub fn biases(&self) -> Vec<Option<LocationBias>> {
        self.search_log.lock().unwrap().iter().map(|(_, b)| *b).collect()
    }

    /// Identifiers whose detail was requested, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.detail_log.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.search_log.lock().unwrap().len() + self.detail_log.lock().unwrap().len()
    }
}

fn to_ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

async fn pause(delay: Option<Duration>) {
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
}

#[async_trait]
impl PlacesLookup for ScriptedLookup {
    async fn search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<String>, LookupError> {
        self.search_log.lock().unwrap().push((query.to_string(), bias));
        match self.searches.get(query) {
            Some((result, delay)) => {
                pause(*delay).await;
                result.clone()
            }
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_detail(&self, id: &str) -> Result<Option<PlaceDetail>, LookupError> {
        self.detail_log.lock().unwrap().push(id.to_string());
        match self.details.get(id) {
            Some((result, delay)) => {
                pause(*delay).await;
                result.clone()
            }
            None => Ok(None),
        }
    }
}
