#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    extract::{Form, Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Duration;
use serde_json::{json, Value};

use fare_watch::services::{
    auth_controller::AmadeusConfig, notification_client::TwilioConfig, sheet_client::SheetConfig,
};

/// Stand-in for Amadeus, Sheety and Twilio on one listener.
pub struct MockState {
    pub token_expires_in: i64,
    pub token_status: u16,
    pub location_status: u16,
    pub location_codes: Vec<&'static str>,
    pub offers_status: u16,
    pub offers: Value,
    pub sheet_rows: Value,
    pub sheet_status: u16,
    pub update_status: u16,
    pub sms_status: u16,

    pub token_calls: AtomicUsize,
    pub location_calls: AtomicUsize,
    pub offer_calls: AtomicUsize,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub location_queries: Mutex<Vec<HashMap<String, String>>>,
    pub offer_bodies: Mutex<Vec<Value>>,
    pub bearer_tokens: Mutex<Vec<String>>,
    pub sheet_auth: Mutex<Vec<String>>,
    pub sheet_updates: Mutex<Vec<(String, Value)>>,
    pub sms_auth: Mutex<Vec<String>>,
    pub sms_forms: Mutex<Vec<HashMap<String, String>>>,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            token_expires_in: 1799,
            token_status: 200,
            location_status: 200,
            location_codes: vec!["PAR"],
            offers_status: 200,
            offers: json!({ "data": [] }),
            sheet_rows: json!({ "prices": [] }),
            sheet_status: 200,
            update_status: 200,
            sms_status: 201,
            token_calls: AtomicUsize::new(0),
            location_calls: AtomicUsize::new(0),
            offer_calls: AtomicUsize::new(0),
            token_forms: Mutex::new(Vec::new()),
            location_queries: Mutex::new(Vec::new()),
            offer_bodies: Mutex::new(Vec::new()),
            bearer_tokens: Mutex::new(Vec::new()),
            sheet_auth: Mutex::new(Vec::new()),
            sheet_updates: Mutex::new(Vec::new()),
            sms_auth: Mutex::new(Vec::new()),
            sms_forms: Mutex::new(Vec::new()),
        }
    }
}

impl MockState {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub fn offer(total: &str, from: &str, to: &str, out_at: &str, back_at: &str) -> Value {
    json!({
        "type": "flight-offer",
        "price": { "currency": "GBP", "total": total },
        "itineraries": [{
            "segments": [
                { "departure": { "iataCode": from, "at": out_at }, "arrival": { "iataCode": to, "at": out_at } },
                { "departure": { "iataCode": to, "at": back_at }, "arrival": { "iataCode": from, "at": back_at } }
            ]
        }]
    })
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn auth_header(headers: &HeaderMap) -> String {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let n = state.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
    state.token_forms.lock().unwrap().push(form);
    if state.token_status != 200 {
        return (status(state.token_status), Json(json!({ "error": "invalid_client" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "type": "amadeusOAuth2Token",
            "token_type": "Bearer",
            "access_token": format!("token-{}", n),
            "expires_in": state.token_expires_in,
            "state": "approved"
        })),
    )
}

async fn locations(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.location_calls.fetch_add(1, Ordering::SeqCst);
    state.bearer_tokens.lock().unwrap().push(auth_header(&headers));
    state.location_queries.lock().unwrap().push(query);
    if state.location_status != 200 {
        return (status(state.location_status), Json(json!({ "errors": [] })));
    }
    let data: Vec<Value> = state
        .location_codes
        .iter()
        .map(|code| json!({ "type": "location", "subType": "CITY", "iataCode": code }))
        .collect();
    (StatusCode::OK, Json(json!({ "data": data })))
}

async fn flight_offers(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.offer_calls.fetch_add(1, Ordering::SeqCst);
    state.bearer_tokens.lock().unwrap().push(auth_header(&headers));
    state.offer_bodies.lock().unwrap().push(body);
    if state.offers_status != 200 {
        return (status(state.offers_status), Json(json!({ "errors": [] })));
    }
    (StatusCode::OK, Json(state.offers.clone()))
}

async fn sheet_list(State(state): State<Arc<MockState>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.sheet_auth.lock().unwrap().push(auth_header(&headers));
    (status(state.sheet_status), Json(state.sheet_rows.clone()))
}

async fn sheet_update(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.sheet_auth.lock().unwrap().push(auth_header(&headers));
    state.sheet_updates.lock().unwrap().push((id, body.clone()));
    (status(state.update_status), Json(body))
}

async fn sms(
    State(state): State<Arc<MockState>>,
    Path(_sid): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.sms_auth.lock().unwrap().push(auth_header(&headers));
    state.sms_forms.lock().unwrap().push(form);
    if state.sms_status >= 300 {
        return (status(state.sms_status), Json(json!({ "code": 21211, "message": "Invalid 'To' Phone Number" })));
    }
    (
        status(state.sms_status),
        Json(json!({ "sid": "SM0123456789", "status": "queued", "error_message": null })),
    )
}

/// Binds an ephemeral port and returns the base URL.
pub async fn spawn(state: Arc<MockState>) -> String {
    let app = Router::new()
        .route("/v1/security/oauth2/token", post(token))
        .route("/v1/reference-data/locations", get(locations))
        .route("/v2/shopping/flight-offers", post(flight_offers))
        .route("/sheet", get(sheet_list))
        .route("/sheet/{id}", put(sheet_update))
        .route("/2010-04-01/Accounts/{sid}/Messages.json", post(sms))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn amadeus_config(base_url: &str) -> AmadeusConfig {
    AmadeusConfig {
        api_key: Some("key".to_string()),
        api_secret: Some("secret".to_string()),
        base_url: base_url.to_string(),
        token_margin: Duration::seconds(10),
    }
}

pub fn sheet_config(base_url: &str) -> SheetConfig {
    SheetConfig {
        bearer_token: "sheet-token".to_string(),
        endpoint: format!("{}/sheet", base_url),
        collection: "prices".to_string(),
        row_key: "price".to_string(),
    }
}

pub fn twilio_config(base_url: &str) -> TwilioConfig {
    TwilioConfig {
        account_sid: "AC123".to_string(),
        auth_token: "twilio-secret".to_string(),
        from_number: "+15550001111".to_string(),
        to_number: "+447700900123".to_string(),
        base_url: base_url.to_string(),
    }
}
