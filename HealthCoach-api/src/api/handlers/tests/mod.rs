mod blood_oxygen_test;
mod heart_rate_test;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use health_coach_domain::testing::{
    mock_token_config, MockBloodOxygenService, MockHealthService, MockHeartRateService, MockSignupService,
};

use crate::api::{create_app, AppState};

/// Assemble application state from individual mock services
pub fn state_with(heart_rate: MockHeartRateService, signup: MockSignupService, health: MockHealthService) -> AppState {
    let relay = heart_rate.relay();
    AppState {
        signup_service: Arc::new(signup),
        heart_rate_service: Arc::new(heart_rate),
        blood_oxygen_service: Arc::new(MockBloodOxygenService::new()),
        health_service: Arc::new(health),
        relay,
        token_config: mock_token_config(),
        environment: Arc::from("test"),
    }
}

/// Application state where every mock service is healthy and empty
pub fn test_state() -> AppState {
    state_with(MockHeartRateService::new(), MockSignupService::new(), MockHealthService::new())
}

pub fn test_app() -> Router {
    create_app(test_state())
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    raw_request(method, uri, body.to_string())
}

pub fn raw_request(method: Method, uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send a request through a clone of the router and decode the JSON body
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}
