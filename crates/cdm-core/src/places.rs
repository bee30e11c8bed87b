//! The places lookup capability consumed by the search pipeline.
//!
//! Adapters live in `cdm-places`; tests supply scripted fakes.

use crate::{
    error::LookupError,
    types::{LocationBias, PlaceDetail},
};
use async_trait::async_trait;

/// An external provider that can answer free-text place queries and resolve
/// place identifiers to detail records.
///
/// Implementations may be called concurrently from many tasks. A provider
/// may return the same identifier from several biased queries.
#[async_trait]
pub trait PlacesLookup: Send + Sync {
    /// Candidate place identifiers for `query`, best match first.
    async fn search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<String>, LookupError>;

    /// Detail for one identifier. `Ok(None)` when the provider does not know it.
    async fn fetch_detail(&self, id: &str) -> Result<Option<PlaceDetail>, LookupError>;
}
