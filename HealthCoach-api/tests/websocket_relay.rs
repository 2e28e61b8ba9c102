//! End-to-end tests for the live heart rate feed, against a real listener

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use health_coach_api::{create_app, AppState};
use health_coach_domain::testing::{
    mock_token_config, MockBloodOxygenService, MockHealthService, MockHeartRateService, MockSignupService,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn test_app() -> Router {
    let heart_rate = MockHeartRateService::new();
    let relay = heart_rate.relay();
    create_app(AppState {
        signup_service: Arc::new(MockSignupService::new()),
        heart_rate_service: Arc::new(heart_rate),
        blood_oxygen_service: Arc::new(MockBloodOxygenService::new()),
        health_service: Arc::new(MockHealthService::new()),
        relay,
        token_config: mock_token_config(),
        environment: Arc::from("test"),
    })
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    client
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn post_heart_rate(app: &Router, body: Value) -> StatusCode {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/heartrate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_client_receives_empty_snapshot_then_updates() {
    let app = test_app();
    let addr = serve(app.clone()).await;
    let mut client = connect(addr).await;

    assert_eq!(
        next_json(&mut client).await,
        json!({ "heartRate": null, "timestamp": null, "sampleCount": 0 })
    );

    assert_eq!(post_heart_rate(&app, json!({ "heartRate": [82, 90] })).await, StatusCode::OK);

    let update = next_json(&mut client).await;
    assert_eq!(update["heartRate"], 82.0);
    assert_eq!(update["sampleCount"], 2);
    assert!(update["timestamp"].is_string());
}

#[tokio::test]
async fn test_rejected_samples_are_not_pushed() {
    let app = test_app();
    let addr = serve(app.clone()).await;
    let mut client = connect(addr).await;
    next_json(&mut client).await;

    assert_eq!(post_heart_rate(&app, json!({ "heartRate": 20 })).await, StatusCode::BAD_REQUEST);
    assert_eq!(post_heart_rate(&app, json!({ "heartRate": 90 })).await, StatusCode::OK);

    assert_eq!(next_json(&mut client).await["heartRate"], 90.0);
}

#[tokio::test]
async fn test_late_client_gets_latest_and_all_clients_get_updates() {
    let app = test_app();
    let addr = serve(app.clone()).await;

    post_heart_rate(&app, json!({ "heartRate": 64 })).await;

    let mut first = connect(addr).await;
    assert_eq!(next_json(&mut first).await["heartRate"], 64.0);
    let mut second = connect(addr).await;
    assert_eq!(next_json(&mut second).await["heartRate"], 64.0);

    post_heart_rate(&app, json!({ "heartRate": 120 })).await;

    assert_eq!(next_json(&mut first).await["heartRate"], 120.0);
    assert_eq!(next_json(&mut second).await["heartRate"], 120.0);
}

#[tokio::test]
async fn test_closed_client_does_not_block_others() {
    let app = test_app();
    let addr = serve(app.clone()).await;

    let mut leaving = connect(addr).await;
    next_json(&mut leaving).await;
    leaving.send(Message::Close(None)).await.unwrap();
    drop(leaving);

    let mut staying = connect(addr).await;
    next_json(&mut staying).await;

    post_heart_rate(&app, json!({ "heartRate": 75 })).await;
    assert_eq!(next_json(&mut staying).await["heartRate"], 75.0);
}
