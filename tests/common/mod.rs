//! Shared test utilities for cdm integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. The scripted lookup is deterministic under
//! `tokio::time::pause()`; the fake HTTP API binds a random local port.

pub mod assertions;
pub mod builders;
pub mod fake_places;
pub mod fake_places_api;

pub use builders::*;
pub use fake_places::ScriptedLookup;
pub use fake_places_api::FakePlacesApi;
