//! Offline places provider backed by a JSON list.
//!
//! The file is a JSON array of `{id, name, address?, latitude, longitude}`
//! records. A query matches a place when any of its terms (ignoring the
//! filler words "near" and "me") appears in the name or address, ignoring
//! case. With a location bias only places inside the circle are returned.

use crate::BuildError;
use async_trait::async_trait;
use cdm_core::{Coordinate, LocationBias, LookupError, PlaceDetail, PlacesLookup};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const SAMPLE_PLACES: &str = include_str!("../fixtures/sample_places.json");

/// Words dropped from a query before matching.
const FILLER_WORDS: [&str; 2] = ["near", "me"];

#[derive(Debug, Clone, Deserialize)]
struct FixturePlace {
    id: String,
    name: String,
    #[serde(default)]
    address: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl FixturePlace {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    fn matches(&self, terms: &[String]) -> bool {
        let name = self.name.to_lowercase();
        let address = self.address.as_deref().unwrap_or_default().to_lowercase();
        terms.iter().any(|t| name.contains(t.as_str()) || address.contains(t.as_str()))
    }

    fn to_detail(&self) -> PlaceDetail {
        PlaceDetail {
            id: self.id.clone(),
            name: self.name.clone(),
            formatted_address: self.address.clone(),
            coordinate: self.coordinate(),
        }
    }
}

pub struct FixturePlacesClient {
    places: Vec<FixturePlace>,
}

impl FixturePlacesClient {
    /// Parse a JSON array of place records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let places: Vec<FixturePlace> = serde_json::from_str(json)?;
        Ok(Self { places })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    /// The embedded San Francisco sample set.
    pub fn sample() -> Self {
        Self::from_json(SAMPLE_PLACES).expect("embedded sample places must be valid JSON")
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

#[async_trait]
impl PlacesLookup for FixturePlacesClient {
    async fn search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<String>, LookupError> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = self
            .places
            .iter()
            .filter(|p| p.matches(&terms))
            .filter(|p| {
                bias.map_or(true, |b| b.center.distance_to(&p.coordinate()) <= b.radius_meters)
            })
            .map(|p| p.id.clone())
            .collect();
        debug!(query, matches = ids.len(), "fixture search");
        Ok(ids)
    }

    async fn fetch_detail(&self, id: &str) -> Result<Option<PlaceDetail>, LookupError> {
        Ok(self.places.iter().find(|p| p.id == id).map(FixturePlace::to_detail))
    }
}

fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|t| !FILLER_WORDS.contains(&t.as_str()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
