use std::sync::Arc;

use axum::http::{Method, StatusCode};
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::json;

use health_coach_domain::entities::blood_oxygen::BloodOxygenReading;
use health_coach_domain::testing::MockBloodOxygenService;

use super::{get_request, json_request, send, test_app, test_state};
use crate::api::{create_app, AppState};

fn hours_ago(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn app_with(blood_oxygen: MockBloodOxygenService) -> axum::Router {
    create_app(AppState {
        blood_oxygen_service: Arc::new(blood_oxygen),
        ..test_state()
    })
}

#[tokio::test]
async fn test_record_blood_oxygen() {
    let app = test_app();

    let (status, _, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/bloodoxygen",
            json!({ "spo2": 97.5, "timestamp": "2024-05-01T10:30:00+02:00" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Blood oxygen recorded");
    assert_eq!(body["data"]["spo2"], 97.5);
    assert_eq!(body["data"]["recordedAt"], "2024-05-01T08:30:00.000Z");
    assert!(body["data"]["id"].is_string());
}

#[tokio::test]
async fn test_invalid_samples_are_rejected() {
    let app = test_app();

    let cases = [
        json!({}),
        json!({ "spo2": 0.97 }),
        json!({ "spo2": 101 }),
        json!({ "spo2": "high" }),
        json!({ "spo2": 97, "timestamp": "later" }),
    ];
    for case in cases {
        let (status, _, body) = send(&app, json_request(Method::POST, "/api/bloodoxygen", case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {} should be rejected", case);
        assert_eq!(body["error"], "validation_error");
    }

    let (_, _, body) = send(&app, get_request("/api/bloodoxygen/history?range=all")).await;
    assert_eq!(body["total_count"], 0);
}

#[tokio::test]
async fn test_history_and_stats_follow_range() {
    let app = app_with(MockBloodOxygenService::with_readings(vec![
        BloodOxygenReading {
            id: "week-old".to_string(),
            value: 91.0,
            recorded_at: hours_ago(24 * 6),
        },
        BloodOxygenReading {
            id: "morning".to_string(),
            value: 96.0,
            recorded_at: hours_ago(5),
        },
        BloodOxygenReading {
            id: "latest".to_string(),
            value: 98.0,
            recorded_at: hours_ago(1),
        },
    ]));

    let (status, _, body) = send(&app, get_request("/api/bloodoxygen/history?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["data"][0]["id"], "latest");
    assert_eq!(body["next"], "/api/bloodoxygen/history?range=24h&limit=1&offset=1&sort=desc");

    let (_, _, body) = send(&app, get_request("/api/bloodoxygen/history?range=7d&sort=asc")).await;
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["data"][0]["id"], "week-old");

    let (status, _, body) = send(&app, get_request("/api/bloodoxygen/stats?range=7d")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average"], 95.0);
    assert_eq!(body["min"], 91.0);
    assert_eq!(body["max"], 98.0);
    assert_eq!(body["current"], 98.0);
    assert_eq!(body["readingCount"], 3);
    assert_eq!(body["range"], "7d");
}

#[tokio::test]
async fn test_empty_stats_and_bad_queries() {
    let app = test_app();

    let (status, _, body) = send(&app, get_request("/api/bloodoxygen/stats")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "insufficient_data");

    for uri in [
        "/api/bloodoxygen/stats?range=1y",
        "/api/bloodoxygen/history?limit=0",
        "/api/bloodoxygen/history?offset=18446744073709551615",
    ] {
        let (status, _, _) = send(&app, get_request(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} should be rejected", uri);
    }
}

#[tokio::test]
async fn test_storage_failure_is_server_error() {
    let app = app_with(MockBloodOxygenService::with_storage_failure());

    let (status, _, body) = send(&app, json_request(Method::POST, "/api/bloodoxygen", json!({ "spo2": 97 }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "An unexpected error occurred");
}

#[tokio::test]
async fn test_blood_oxygen_does_not_touch_heart_rate_relay() {
    let state = test_state();
    let (_, mut updates) = state.relay.subscribe().await;
    let app = create_app(state);

    send(&app, json_request(Method::POST, "/api/bloodoxygen", json!({ "spo2": 97 }))).await;

    assert!(updates.try_recv().is_err());
    let (_, _, body) = send(&app, get_request("/api/heartrate")).await;
    assert_eq!(body["heartRate"], serde_json::Value::Null);
}
