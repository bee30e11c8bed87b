//! Google Places (New) HTTP adapter.
//!
//! * `search` posts the query to `/v1/places:autocomplete`, restricted to
//!   establishments and biased to the search circle, and returns the place
//!   ids of the place predictions in the order the API ranked them.
//! * `fetch_detail` reads `/v1/places/{id}` with a field mask limited to the
//!   id, display name, formatted address and location.

use async_trait::async_trait;
use cdm_core::{Coordinate, LocationBias, LookupError, PlaceDetail, PlacesLookup};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";
const DETAIL_FIELD_MASK: &str = "id,displayName,formattedAddress,location";

/// Largest circle radius the API accepts for a location bias.
const MAX_BIAS_RADIUS_METERS: f64 = 50_000.0;

/// Name used when a detail record has no display name.
const UNKNOWN_NAME: &str = "Unknown";

pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn detail_url(&self, id: &str) -> Result<Url, LookupError> {
        let mut url = Url::parse(&format!("{}/v1/places", self.base_url))
            .map_err(|e| LookupError::Unavailable(format!("bad base url {:?}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| LookupError::Unavailable(format!("base url {:?} cannot carry a path", self.base_url)))?
            .push(id);
        Ok(url)
    }
}

#[async_trait]
impl PlacesLookup for GooglePlacesClient {
    #[instrument(skip(self, bias))]
    async fn search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<String>, LookupError> {
        let body = AutocompleteRequest::new(query, bias);
        let resp = self
            .client
            .post(format!("{}/v1/places:autocomplete", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let resp = check_status(resp).await?;
        let data: AutocompleteResponse = resp.json().await.map_err(transport_error)?;
        let ids = data.place_ids();
        debug!(count = ids.len(), "autocomplete answered");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn fetch_detail(&self, id: &str) -> Result<Option<PlaceDetail>, LookupError> {
        let resp = self
            .client
            .get(self.detail_url(id)?)
            .header(API_KEY_HEADER, &self.api_key)
            .header(FIELD_MASK_HEADER, DETAIL_FIELD_MASK)
            .send()
            .await
            .map_err(transport_error)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp).await?;
        let data: DetailResponse = resp.json().await.map_err(transport_error)?;
        Ok(data.into_detail())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AutocompleteRequest<'a> {
    input: &'a str,
    included_primary_types: [&'static str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    location_bias: Option<WireBias>,
}

impl<'a> AutocompleteRequest<'a> {
    fn new(input: &'a str, bias: Option<LocationBias>) -> Self {
        Self {
            input,
            included_primary_types: ["establishment"],
            location_bias: bias.map(|b| WireBias {
                circle: WireCircle {
                    center: WireLatLng::from(b.center),
                    radius: b.radius_meters.clamp(0.0, MAX_BIAS_RADIUS_METERS),
                },
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct WireBias {
    circle: WireCircle,
}

#[derive(Debug, Serialize)]
struct WireCircle {
    center: WireLatLng,
    radius: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireLatLng {
    latitude: f64,
    longitude: f64,
}

impl From<Coordinate> for WireLatLng {
    fn from(c: Coordinate) -> Self {
        Self { latitude: c.latitude, longitude: c.longitude }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

impl AutocompleteResponse {
    /// Place ids in ranked order. Query predictions carry no id and are skipped.
    fn place_ids(self) -> Vec<String> {
        self.suggestions
            .into_iter()
            .filter_map(|s| s.place_prediction)
            .filter_map(|p| p.place_id)
            .filter(|id| !id.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Suggestion {
    place_prediction: Option<PlacePrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacePrediction {
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailResponse {
    id: Option<String>,
    display_name: Option<LocalizedText>,
    formatted_address: Option<String>,
    location: Option<WireLatLng>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: String,
}

impl DetailResponse {
    /// A record without an id or a location cannot be ranked, so it is
    /// treated like an unknown place.
    fn into_detail(self) -> Option<PlaceDetail> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let location = self.location?;
        let name = self
            .display_name
            .map(|n| n.text)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        Some(PlaceDetail {
            id,
            name,
            formatted_address: self.formatted_address.filter(|a| !a.is_empty()),
            coordinate: Coordinate::new(location.latitude, location.longitude),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn transport_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout
    } else if err.is_decode() {
        LookupError::Decode(err.to_string())
    } else {
        LookupError::Unavailable(err.to_string())
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, LookupError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(LookupError::Rejected {
        status: status.as_u16(),
        message: rejection_message(&body, status),
    })
}

fn rejection_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
