//! cdm-core: Charity Donation Manager core library.
//!
//! This crate holds the nearby-charity search pipeline and the local records
//! the front ends read and write.
//!
//! # Architecture
//!
//! ```text
//! Category ──► expand ──► SearchAggregator ──► SearchSession ──► UI
//!                               │
//!                         PlacesLookup (external provider)
//! ```
//!
//! Aggregation runs execute on `tokio` tasks and report back to the session
//! over a channel. The session is owned by the UI loop and is the only writer
//! of the published result list.

pub mod aggregator;
pub mod category;
pub mod config;
pub mod error;
pub mod geo;
pub mod places;
pub mod session;
pub mod store;
pub mod types;

pub use aggregator::SearchAggregator;
pub use category::{expand, Category};
pub use error::{LookupError, StoreError};
pub use places::PlacesLookup;
pub use session::SearchSession;
pub use types::{Coordinate, LocationBias, Place, PlaceDetail};
