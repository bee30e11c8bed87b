//! cdm-places: [`PlacesLookup`] adapters for cdm.
//!
//! Two providers are available:
//!
//! * [`GooglePlacesClient`] talks to the Places HTTP API (autocomplete for
//!   candidate ids, place details for resolution).
//! * [`FixturePlacesClient`] answers from a local JSON list of places, so the
//!   app works offline and tests stay deterministic.
//!
//! [`from_config`] picks one based on the `[places]` config section.

pub mod fixture;
pub mod google;

pub use fixture::FixturePlacesClient;
pub use google::GooglePlacesClient;

use cdm_core::{
    config::{PlacesConfig, ProviderKind},
    PlacesLookup,
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::info;

/// Errors building a provider from configuration.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("provider \"google\" needs places.api_key (or CDM_PLACES__API_KEY)")]
    MissingApiKey,
    #[error("could not read fixture file: {0}")]
    Fixture(#[from] std::io::Error),
    #[error("fixture file is not a JSON list of places: {0}")]
    FixtureParse(#[from] serde_json::Error),
    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Build the provider selected by `cfg`.
///
/// `auto` resolves to Google when an API key is configured and to the
/// fixture provider otherwise.
pub fn from_config(cfg: &PlacesConfig) -> Result<Arc<dyn PlacesLookup>, BuildError> {
    let has_key = !cfg.api_key.trim().is_empty();
    let kind = match cfg.provider {
        ProviderKind::Auto if has_key => ProviderKind::Google,
        ProviderKind::Auto => ProviderKind::Fixture,
        other => other,
    };

    match kind {
        ProviderKind::Google => {
            if !has_key {
                return Err(BuildError::MissingApiKey);
            }
            info!(base_url = %cfg.base_url, "using Google places provider");
            let client = GooglePlacesClient::new(
                cfg.base_url.clone(),
                cfg.api_key.trim().to_string(),
                Duration::from_secs(cfg.timeout_secs),
            )?;
            Ok(Arc::new(client))
        }
        _ => {
            let client = match &cfg.fixture_path {
                Some(path) => {
                    info!(path = %path.display(), "using fixture places provider");
                    FixturePlacesClient::from_path(path)?
                }
                None => {
                    info!("using embedded sample places");
                    FixturePlacesClient::sample()
                }
            };
            Ok(Arc::new(client))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
