//! Core types for cdm-core.
//!
//! [`Place`] is the value the search pipeline hands to the UI. [`PlaceDetail`]
//! is what a [`PlacesLookup`](crate::PlacesLookup) provider returns before any
//! distance has been computed.

use serde::{Deserialize, Serialize};

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        crate::geo::haversine_meters(self, other)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// Circular region a provider should prefer when answering a text query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationBias {
    pub center: Coordinate,
    pub radius_meters: f64,
}

/// Place record as resolved by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetail {
    /// Provider identifier. May differ from the id used to request it if the
    /// provider normalises identifiers.
    pub id: String,
    pub name: String,
    pub formatted_address: Option<String>,
    pub coordinate: Coordinate,
}

/// A charity candidate ready for display.
///
/// Identity is `id` alone: two places with the same id compare equal and hash
/// identically regardless of the other fields. A search run always builds new
/// values; nothing mutates a published place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    /// Formatted address or short description.
    pub subtitle: Option<String>,
    pub coordinate: Coordinate,
    /// Distance from the search origin. `None` when no origin was available.
    pub distance_meters: Option<f64>,
}

impl Place {
    /// Build a place from a provider record, measuring from `origin` if known.
    pub fn from_detail(detail: PlaceDetail, origin: Option<Coordinate>) -> Self {
        let distance_meters = origin.map(|o| o.distance_to(&detail.coordinate));
        Self {
            id: detail.id,
            name: detail.name,
            subtitle: detail.formatted_address,
            coordinate: detail.coordinate,
            distance_meters,
        }
    }

    /// Sort key for proximity ranking. Unknown distance sorts last.
    pub fn distance_key(&self) -> f64 {
        self.distance_meters.unwrap_or(f64::INFINITY)
    }
}

impl PartialEq for Place {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Place {}

impl std::hash::Hash for Place {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn detail(id: &str, name: &str) -> PlaceDetail {
        PlaceDetail {
            id: id.to_string(),
            name: name.to_string(),
            formatted_address: None,
            coordinate: Coordinate::new(0.0, 0.0),
        }
    }

    #[test]
    fn identity_is_id_only() {
        let a = Place::from_detail(detail("X", "Food Bank"), None);
        let b = Place::from_detail(detail("X", "Renamed"), Some(Coordinate::new(1.0, 1.0)));
        assert_eq!(a, b);

        let set: HashSet<Place> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn distance_only_with_origin() {
        let without = Place::from_detail(detail("A", "a"), None);
        assert!(without.distance_meters.is_none());
        assert_eq!(without.distance_key(), f64::INFINITY);

        let with = Place::from_detail(detail("A", "a"), Some(Coordinate::new(0.0, 0.0)));
        assert_eq!(with.distance_meters, Some(0.0));
    }
}
