// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process stand-in for the Drivvo API.
//!
//! Serves the JSON fixtures under `tests/fixtures/` for one known vehicle,
//! checks the login hash and session token, and can be told to fail
//! individual endpoints.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use drivvo_tracker::config::Config;
use drivvo_tracker::models::EntryData;
use drivvo_tracker::services::drivvo::hash_password;
use drivvo_tracker::services::{DrivvoClient, IntegrationRegistry};
use drivvo_tracker::AppState;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[allow(dead_code)]
pub const TEST_EMAIL: &str = "driver@example.com";
#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "s3cret-pass";
#[allow(dead_code)]
pub const TEST_TOKEN: &str = "session-token-1";
#[allow(dead_code)]
pub const VEHICLE_ID: &str = "1001";
#[allow(dead_code)]
pub const UNKNOWN_VEHICLE_ID: &str = "9999";

/// Endpoints that can be made to fail.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Vehicles,
    Vehicle,
    Refuellings,
    Services,
    Expenses,
    Configuration,
}

/// Shared state of the mock server.
pub struct MockDrivvo {
    failing: Mutex<HashSet<Endpoint>>,
    configuration: Mutex<Value>,
    refuellings: Mutex<Value>,
    logins: AtomicUsize,
    vehicle_fetches: AtomicUsize,
    last_login_headers: Mutex<Option<HeaderMap>>,
    last_login_body: Mutex<Option<Value>>,
}

#[allow(dead_code)]
impl MockDrivvo {
    fn new() -> Self {
        Self {
            failing: Mutex::new(HashSet::new()),
            configuration: Mutex::new(fixture("configuration.json")),
            refuellings: Mutex::new(fixture("refuellings.json")),
            logins: AtomicUsize::new(0),
            vehicle_fetches: AtomicUsize::new(0),
            last_login_headers: Mutex::new(None),
            last_login_body: Mutex::new(None),
        }
    }

    /// Make `endpoint` answer 500 from now on.
    pub fn fail(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    /// Make `endpoint` answer normally again.
    pub fn recover(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().remove(&endpoint);
    }

    fn is_failing(&self, endpoint: Endpoint) -> bool {
        self.failing.lock().unwrap().contains(&endpoint)
    }

    pub fn set_configuration(&self, configuration: Value) {
        *self.configuration.lock().unwrap() = configuration;
    }

    pub fn set_refuellings(&self, refuellings: Value) {
        *self.refuellings.lock().unwrap() = refuellings;
    }

    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn vehicle_fetch_count(&self) -> usize {
        self.vehicle_fetches.load(Ordering::SeqCst)
    }

    pub fn last_login_headers(&self) -> Option<HeaderMap> {
        self.last_login_headers.lock().unwrap().clone()
    }

    pub fn last_login_body(&self) -> Option<Value> {
        self.last_login_body.lock().unwrap().clone()
    }
}

/// Load a JSON fixture from `tests/fixtures/`.
pub fn fixture(name: &str) -> Value {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    let raw = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path, e));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("{}: {}", path, e))
}

type Mock = Arc<MockDrivvo>;

fn failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

/// Reject requests without the session token, or for a failing endpoint.
fn guard(mock: &MockDrivvo, headers: &HeaderMap, endpoint: Endpoint) -> Option<Response> {
    let token = headers.get("x-token").and_then(|v| v.to_str().ok());
    if token != Some(TEST_TOKEN) {
        return Some((StatusCode::UNAUTHORIZED, "missing token").into_response());
    }
    if mock.is_failing(endpoint) {
        return Some(failure());
    }
    None
}

async fn login(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    mock.logins.fetch_add(1, Ordering::SeqCst);
    *mock.last_login_headers.lock().unwrap() = Some(headers);
    *mock.last_login_body.lock().unwrap() = Some(body.clone());

    if mock.is_failing(Endpoint::Login) {
        return failure();
    }

    let expected = hash_password(TEST_PASSWORD);
    if body["email"] == TEST_EMAIL && body["senha"] == expected.as_str() {
        Json(json!({ "token": TEST_TOKEN, "id_usuario": 42 })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "erro": "senha invalida" }))).into_response()
    }
}

async fn vehicles(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    if let Some(rejection) = guard(&mock, &headers, Endpoint::Vehicles) {
        return rejection;
    }
    Json(fixture("vehicles.json")).into_response()
}

async fn vehicle(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Some(rejection) = guard(&mock, &headers, Endpoint::Vehicle) {
        return rejection;
    }
    mock.vehicle_fetches.fetch_add(1, Ordering::SeqCst);
    if id != VEHICLE_ID {
        return (StatusCode::NOT_FOUND, "no such vehicle").into_response();
    }
    Json(fixture("vehicle.json")).into_response()
}

async fn refuellings(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> Response {
    if let Some(rejection) = guard(&mock, &headers, Endpoint::Refuellings) {
        return rejection;
    }
    Json(mock.refuellings.lock().unwrap().clone()).into_response()
}

async fn services(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> Response {
    if let Some(rejection) = guard(&mock, &headers, Endpoint::Services) {
        return rejection;
    }
    Json(fixture("services.json")).into_response()
}

async fn expenses(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> Response {
    if let Some(rejection) = guard(&mock, &headers, Endpoint::Expenses) {
        return rejection;
    }
    Json(fixture("expenses.json")).into_response()
}

async fn configuration(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    if let Some(rejection) = guard(&mock, &headers, Endpoint::Configuration) {
        return rejection;
    }
    Json(mock.configuration.lock().unwrap().clone()).into_response()
}

/// Start the mock on an ephemeral port.
///
/// Returns its state and a client pointed at it.
#[allow(dead_code)]
pub async fn spawn_mock_drivvo() -> (Arc<MockDrivvo>, DrivvoClient) {
    let mock = Arc::new(MockDrivvo::new());

    let app = Router::new()
        .route("/autenticacao/login", post(login))
        .route("/veiculo/web", get(vehicles))
        .route("/veiculo/{id}", get(vehicle))
        .route("/veiculo/{id}/abastecimento/web", get(refuellings))
        .route("/veiculo/{id}/servico/web", get(services))
        .route("/veiculo/{id}/despesa/web", get(expenses))
        .route("/configuracao", get(configuration))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock Drivvo");
    let addr = listener.local_addr().expect("Mock has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock Drivvo crashed");
    });

    let base_url = format!("http://{}", addr);
    let client = DrivvoClient::new(format!("{}/autenticacao/login", base_url), base_url)
        .expect("Failed to build Drivvo client");
    (mock, client)
}

/// Entry data for the mock account.
#[allow(dead_code)]
pub fn test_entry(vehicles: &[&str]) -> EntryData {
    EntryData {
        email: TEST_EMAIL.to_string(),
        password: TEST_PASSWORD.to_string(),
        vehicles: vehicles.iter().map(|v| v.to_string()).collect(),
    }
}

/// Create a test app backed by the mock Drivvo API.
///
/// Nothing is set up yet; call `registry.setup` on the returned state.
#[allow(dead_code)]
pub async fn create_test_app(
    interval: Duration,
) -> (axum::Router, Arc<AppState>, Arc<MockDrivvo>) {
    let (mock, client) = spawn_mock_drivvo().await;

    let mut config = Config::test_default();
    config.entry = test_entry(&[VEHICLE_ID]);
    config.login_url = format!("{}/autenticacao/login", client.base_url());
    config.api_url = client.base_url().to_string();
    config.scan_interval = interval;

    let state = Arc::new(AppState {
        config,
        registry: IntegrationRegistry::new(client, interval),
    });

    let app = drivvo_tracker::routes::create_router(state.clone());
    (app, state, mock)
}
