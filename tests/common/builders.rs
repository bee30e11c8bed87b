//! Test builders: ergonomic constructors for place fixtures and query sets.
//!
//! These panic on invalid input rather than returning `Result`.

use cdm_core::{geo::north_of, Coordinate, PlaceDetail};

/// The search origin used throughout the harnesses.
pub fn origin() -> Coordinate {
    Coordinate::new(0.0, 0.0)
}

/// Owned query list from string literals.
pub fn queries(qs: &[&str]) -> Vec<String> {
    qs.iter().map(|q| q.to_string()).collect()
}

/// Fluent builder for [`PlaceDetail`] fixtures.
///
/// ```rust
/// let detail = DetailBuilder::new("X").name("City Food Bank").meters_north(3_000.0).build();
/// ```
pub struct DetailBuilder {
    id: String,
    name: Option<String>,
    address: Option<String>,
    coordinate: Coordinate,
}

impl DetailBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            address: None,
            coordinate: origin(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn at(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = coordinate;
        self
    }

    /// Place the fixture `meters` due north of [`origin`].
    pub fn meters_north(mut self, meters: f64) -> Self {
        self.coordinate = north_of(&origin(), meters);
        self
    }

    pub fn build(self) -> PlaceDetail {
        let name = self.name.unwrap_or_else(|| format!("Charity {}", self.id));
        PlaceDetail {
            id: self.id,
            name,
            formatted_address: self.address,
            coordinate: self.coordinate,
        }
    }
}

/// Shorthand for a detail `meters` north of [`origin`].
pub fn detail_at(id: &str, meters: f64) -> PlaceDetail {
    DetailBuilder::new(id).meters_north(meters).build()
}
