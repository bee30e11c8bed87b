//! Error types for cdm-core.

use thiserror::Error;

/// Failure reported by a [`PlacesLookup`](crate::PlacesLookup) provider.
///
/// None of these escape an aggregation run: a failed search contributes no
/// candidates and a failed detail fetch contributes no place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("places provider unavailable: {0}")]
    Unavailable(String),
    #[error("places provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("could not decode provider response: {0}")]
    Decode(String),
    #[error("places provider timed out")]
    Timeout,
}

/// Errors from the local record store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("invalid donation amount {0:?}: expected a positive amount with at most two decimals")]
    InvalidAmount(String),
    #[error("a donation needs a charity name")]
    MissingCharity,
}
