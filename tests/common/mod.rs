//! Shared setup for the HTTP tests.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
};
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;

use contact_guard::clock::ManualClock;
use contact_guard::registry::GuardRegistry;
use contact_guard::relay::{RelayTarget, relay_worker};
use contact_guard::state::AppState;
use contact_guard::storage::MemoryStore;
use contact_guard::GuardConfig;

pub const START: i64 = 1_700_000_000_000;

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
}

/// Router over an in-memory store and a manual clock, relaying to `relay_url`
/// or only logging when none is given. Visitors are told apart by
/// `X-Forwarded-For`.
pub fn test_app(relay_url: Option<String>) -> TestApp {
    test_app_with(relay_url, true)
}

pub fn test_app_with(relay_url: Option<String>, trust_forwarded: bool) -> TestApp {
    let clock = Arc::new(ManualClock::new(START));
    let registry = Arc::new(GuardRegistry::new(
        GuardConfig::default(),
        Arc::new(MemoryStore::new()),
        clock.clone(),
    ));

    let (relay_tx, relay_rx) = mpsc::channel(16);
    tokio::spawn(relay_worker(
        relay_rx,
        reqwest::Client::new(),
        RelayTarget::new(relay_url, "contact"),
    ));

    let state = Arc::new(AppState {
        registry,
        clock: clock.clone(),
        relay_tx,
        trust_forwarded,
    });

    TestApp {
        router: contact_guard::app(state),
        clock,
    }
}

/// A form payload stamped `age_ms` before the app clock's current time.
pub fn payload(clock: &ManualClock, age_ms: i64) -> serde_json::Value {
    use contact_guard::clock::Clock;
    serde_json::json!({
        "name": "Grace Hopper",
        "email": "grace@example.com",
        "message": "I would like to talk about compilers.",
        "form_timestamp": (clock.now_ms() - age_ms).to_string(),
    })
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    client: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    dispatch(router, request(method, uri, client, body)).await
}

/// POST to the contact endpoint as if the TCP peer were `peer`, with a
/// forged `X-Forwarded-For`.
pub async fn send_from_peer(
    router: &Router,
    peer: SocketAddr,
    forwarded: &str,
    body: serde_json::Value,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let mut request = request(Method::POST, "/api/contact", Some(forwarded), Some(body));
    request.extensions_mut().insert(ConnectInfo(peer));
    dispatch(router, request).await
}

fn request(
    method: Method,
    uri: &str,
    client: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(client) = client {
        builder = builder.header("x-forwarded-for", client);
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn dispatch(router: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}

pub fn json<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).expect("response body is json")
}
