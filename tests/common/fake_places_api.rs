//! Fake Places HTTP API server for integration tests.
//!
//! Spins up a minimal `axum` server on a random TCP port bound to 127.0.0.1
//! that answers the two endpoints the HTTP adapter uses:
//! - `POST /v1/places:autocomplete`: scripted place predictions per input
//! - `GET /v1/places/{id}`: scripted detail records, 404 for unknown ids
//!
//! Requests without the expected API key get a 403 with a Google-style error
//! body. Autocomplete bodies are recorded for assertions.
//!
//! ```rust,no_run
//! let api = FakePlacesApi::start("test-key").await.unwrap();
//! api.add_prediction("food bank near me", "X").await;
//! api.add_place(detail_at("X", 3_000.0)).await;
//! let client = GooglePlacesClient::new(api.base_url(), "test-key", Duration::from_secs(2))?;
//! ```

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cdm_core::PlaceDetail;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Default)]
struct ApiState {
    api_key: String,
    predictions: HashMap<String, Vec<String>>,
    places: HashMap<String, Value>,
    autocomplete_bodies: Vec<Value>,
    field_masks: Vec<Option<String>>,
    delay: Option<Duration>,
}

type Shared = Arc<Mutex<ApiState>>;

/// Handle to the running fake Places API server.
pub struct FakePlacesApi {
    addr: SocketAddr,
    state: Shared,
}

impl FakePlacesApi {
    /// Start the server on a random port, accepting `api_key`.
    pub async fn start(api_key: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState {
            api_key: api_key.to_string(),
            ..ApiState::default()
        }));

        let app = Router::new()
            .route("/v1/places:autocomplete", post(autocomplete))
            .route("/v1/places/{id}", get(place_detail))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Append `place_id` to the predictions returned for `input`.
    pub async fn add_prediction(&self, input: &str, place_id: &str) {
        let mut state = self.state.lock().await;
        state
            .predictions
            .entry(input.to_string())
            .or_default()
            .push(place_id.to_string());
    }

    /// Serve `detail` from `/v1/places/{detail.id}`.
    pub async fn add_place(&self, detail: PlaceDetail) {
        let body = json!({
            "id": detail.id,
            "displayName": { "text": detail.name, "languageCode": "en" },
            "formattedAddress": detail.formatted_address,
            "location": {
                "latitude": detail.coordinate.latitude,
                "longitude": detail.coordinate.longitude
            }
        });
        self.add_raw_place(&detail.id, body).await;
    }

    /// Serve an arbitrary JSON body for `id`.
    pub async fn add_raw_place(&self, id: &str, body: Value) {
        self.state.lock().await.places.insert(id.to_string(), body);
    }

    /// Delay every response by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        self.state.lock().await.delay = Some(delay);
    }

    pub async fn autocomplete_bodies(&self) -> Vec<Value> {
        self.state.lock().await.autocomplete_bodies.clone()
    }

    pub async fn field_masks(&self) -> Vec<Option<String>> {
        self.state.lock().await.field_masks.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

fn google_error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": { "code": status.as_u16(), "message": message, "status": "ERROR" }
    });
    (status, Json(body)).into_response()
}

async fn authorize(state: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    let (expected, delay) = {
        let state = state.lock().await;
        (state.api_key.clone(), state.delay)
    };
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
    match headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) {
        Some(key) if key == expected => Ok(()),
        _ => Err(google_error(StatusCode::FORBIDDEN, "API key not valid. Please pass a valid API key.")),
    }
}

async fn autocomplete(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers).await {
        return resp;
    }
    let mut state = state.lock().await;
    let input = body["input"].as_str().unwrap_or_default().to_string();
    state.autocomplete_bodies.push(body);

    let mut suggestions: Vec<Value> = state
        .predictions
        .get(&input)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|id| json!({ "placePrediction": { "placeId": id, "text": { "text": id } } }))
        .collect();
    // The real API mixes in query predictions that carry no place id.
    suggestions.push(json!({ "queryPrediction": { "text": { "text": input } } }));

    Json(json!({ "suggestions": suggestions })).into_response()
}

async fn place_detail(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = authorize(&state, &headers).await {
        return resp;
    }
    let mask = headers
        .get("x-goog-fieldmask")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let mut state = state.lock().await;
    state.field_masks.push(mask.clone());
    if mask.is_none() {
        return google_error(StatusCode::BAD_REQUEST, "FieldMask is a required parameter.");
    }
    match state.places.get(&id) {
        Some(body) => Json(body.clone()).into_response(),
        None => google_error(StatusCode::NOT_FOUND, "Requested entity was not found."),
    }
}
