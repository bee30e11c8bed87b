//! Nearby-charity search aggregation.
//!
//! One aggregation run fans text queries out to a [`PlacesLookup`] provider,
//! resolves every candidate identifier concurrently, then merges the details
//! in discovery order:
//!
//! ```text
//! queries ──► search (join) ──► candidate ids ──► fetch_detail (join)
//!                                                      │
//!       truncate ◄── sort by distance ◄── radius filter ◄── dedup by id
//! ```
//!
//! A run never fails. Provider errors are logged and the affected query or
//! identifier simply contributes nothing, so the worst outcome is a shorter
//! (possibly empty) list.

use crate::{
    places::PlacesLookup,
    types::{Coordinate, LocationBias, Place, PlaceDetail},
};
use futures::future::join_all;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info, instrument, warn};

/// Result cap used by the discover screen.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Stateless search pipeline over a shared provider. Cloning is cheap and
/// clones share nothing mutable, so concurrent runs cannot interfere.
#[derive(Clone)]
pub struct SearchAggregator {
    client: Arc<dyn PlacesLookup>,
}

impl SearchAggregator {
    pub fn new(client: Arc<dyn PlacesLookup>) -> Self {
        Self { client }
    }

    /// Run every query as one batch and return at most `max_results` places,
    /// nearest first.
    ///
    /// With an `origin`, searches are biased to the `radius_meters` circle
    /// around it and places outside the circle are dropped; without one, no
    /// distance is computed and discovery order is kept. The returned future
    /// completes only once every search and detail fetch it started has
    /// finished.
    #[instrument(skip(self, queries), fields(queries = queries.len()))]
    pub async fn run(
        &self,
        queries: &[String],
        origin: Option<Coordinate>,
        radius_meters: f64,
        max_results: usize,
    ) -> Vec<Place> {
        if queries.is_empty() || max_results == 0 {
            return Vec::new();
        }

        let bias = origin.map(|center| LocationBias { center, radius_meters });
        let per_query_cap = max_results.saturating_mul(2);

        let candidate_lists =
            join_all(queries.iter().map(|q| self.candidates(q, bias, per_query_cap))).await;

        // The same id often comes back from several overlapping queries;
        // resolve it once.
        let mut requested = HashSet::new();
        let ids: Vec<String> = candidate_lists
            .into_iter()
            .flatten()
            .filter(|id| requested.insert(id.clone()))
            .collect();

        let details = join_all(ids.iter().map(|id| self.detail(id))).await;
        let resolved = details.iter().filter(|d| d.is_some()).count();

        let places = rank(details.into_iter().flatten(), origin, radius_meters, max_results);
        debug!(
            candidates = ids.len(),
            resolved,
            kept = places.len(),
            "aggregation run finished"
        );
        places
    }

    /// Run `queries` one at a time, merging each batch into a deduplicated
    /// total and stopping as soon as that total reaches `max_results`.
    ///
    /// Later queries are skipped once the budget is met. The merged list is
    /// re-sorted by distance before it is returned.
    #[instrument(skip(self, queries), fields(queries = queries.len()))]
    pub async fn run_category(
        &self,
        queries: &[String],
        origin: Option<Coordinate>,
        radius_meters: f64,
        max_results: usize,
    ) -> Vec<Place> {
        let mut seen = HashSet::new();
        let mut merged: Vec<Place> = Vec::new();

        for (index, query) in queries.iter().enumerate() {
            if merged.len() >= max_results {
                debug!(skipped = queries.len() - index, "result budget met, skipping remaining queries");
                break;
            }
            let batch = self
                .run(std::slice::from_ref(query), origin, radius_meters, max_results)
                .await;
            for place in batch {
                if merged.len() >= max_results {
                    break;
                }
                if seen.insert(place.id.clone()) {
                    merged.push(place);
                }
            }
        }

        sort_by_distance(&mut merged);
        info!(results = merged.len(), "category search complete");
        merged
    }

    async fn candidates(&self, query: &str, bias: Option<LocationBias>, cap: usize) -> Vec<String> {
        match self.client.search(query, bias).await {
            Ok(mut ids) => {
                ids.truncate(cap);
                ids
            }
            Err(err) => {
                warn!(query, error = %err, "place search failed, query contributes no candidates");
                Vec::new()
            }
        }
    }

    async fn detail(&self, id: &str) -> Option<PlaceDetail> {
        match self.client.fetch_detail(id).await {
            Ok(Some(detail)) => Some(detail),
            Ok(None) => {
                debug!(id, "provider has no detail for candidate");
                None
            }
            Err(err) => {
                warn!(id, error = %err, "place detail fetch failed, dropping candidate");
                None
            }
        }
    }
}

/// Deduplicate, measure, filter, sort and truncate resolved details.
///
/// `details` must be in discovery order: the first record for an id wins.
fn rank(
    details: impl IntoIterator<Item = PlaceDetail>,
    origin: Option<Coordinate>,
    radius_meters: f64,
    max_results: usize,
) -> Vec<Place> {
    let mut seen = HashSet::new();
    let mut places: Vec<Place> = details
        .into_iter()
        .filter(|d| seen.insert(d.id.clone()))
        .map(|d| Place::from_detail(d, origin))
        .filter(|p| p.distance_meters.map_or(true, |d| d <= radius_meters))
        .collect();

    sort_by_distance(&mut places);
    places.truncate(max_results);
    places
}

/// Stable ascending sort; ties keep discovery order.
fn sort_by_distance(places: &mut [Place]) {
    places.sort_by(|a, b| a.distance_key().total_cmp(&b.distance_key()));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::north_of;
    use pretty_assertions::assert_eq;

    fn detail_at(id: &str, origin: &Coordinate, meters: f64) -> PlaceDetail {
        PlaceDetail {
            id: id.to_string(),
            name: format!("place {id}"),
            formatted_address: None,
            coordinate: north_of(origin, meters),
        }
    }

    fn ids(places: &[Place]) -> Vec<&str> {
        places.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn rank_keeps_first_duplicate_and_sorts() {
        let o = Coordinate::new(0.0, 0.0);
        let mut late_dup = detail_at("A", &o, 10.0);
        late_dup.name = "second".to_string();
        let details = vec![
            detail_at("B", &o, 300.0),
            detail_at("A", &o, 100.0),
            late_dup,
            detail_at("C", &o, 200.0),
        ];

        let places = rank(details, Some(o), 1_000.0, 10);
        assert_eq!(ids(&places), vec!["A", "C", "B"]);
        assert_eq!(places[0].name, "place A");
    }

    #[test]
    fn rank_filters_by_radius_inclusive() {
        let o = Coordinate::new(0.0, 0.0);
        let details = vec![detail_at("in", &o, 4_000.0), detail_at("out", &o, 6_000.0)];
        let places = rank(details, Some(o), 5_000.0, 10);
        assert_eq!(ids(&places), vec!["in"]);
    }

    #[test]
    fn rank_without_origin_keeps_discovery_order() {
        let o = Coordinate::new(0.0, 0.0);
        let details = vec![detail_at("far", &o, 90_000.0), detail_at("near", &o, 1.0)];
        let places = rank(details, None, 5.0, 10);
        assert_eq!(ids(&places), vec!["far", "near"]);
        assert!(places.iter().all(|p| p.distance_meters.is_none()));
    }

    #[test]
    fn rank_truncates() {
        let o = Coordinate::new(0.0, 0.0);
        let details = (0..10).map(|i| detail_at(&format!("p{i}"), &o, f64::from(i) * 10.0));
        let places = rank(details, Some(o), 1_000.0, 3);
        assert_eq!(ids(&places), vec!["p0", "p1", "p2"]);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let o = Coordinate::new(0.0, 0.0);
        let mut places: Vec<Place> = ["x", "y", "z"]
            .iter()
            .map(|id| Place::from_detail(detail_at(id, &o, 50.0), Some(o)))
            .collect();
        places.push(Place::from_detail(detail_at("unknown", &o, 0.0), None));
        places.insert(0, Place::from_detail(detail_at("u0", &o, 0.0), None));
        sort_by_distance(&mut places);
        assert_eq!(ids(&places), vec!["x", "y", "z", "u0", "unknown"]);
    }
}
