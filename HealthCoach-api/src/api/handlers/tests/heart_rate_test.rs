use axum::http::{header, Method, StatusCode};
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::json;

use health_coach_domain::entities::heart_rate::HeartRateReading;
use health_coach_domain::testing::{MockHealthService, MockHeartRateService, MockSignupService};

use super::{get_request, json_request, raw_request, send, state_with, test_app, test_state};
use crate::api::create_app;

fn minutes_ago(minutes: i64) -> String {
    (Utc::now() - Duration::minutes(minutes)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[tokio::test]
async fn test_latest_is_empty_before_first_sample() {
    let app = test_app();

    let (status, headers, body) = send(&app, get_request("/api/heartrate")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert_eq!(body, json!({ "heartRate": null, "timestamp": null, "sampleCount": 0 }));
}

#[tokio::test]
async fn test_posted_value_is_returned_by_get() {
    let app = test_app();

    let (status, _, body) = send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": 75 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Heart rate updated");
    assert_eq!(body["data"]["heartRate"], 75.0);
    assert_eq!(body["data"]["sampleCount"], 1);

    let (status, headers, body) = send(&app, get_request("/api/heartrate")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert_eq!(body["heartRate"], 75.0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_out_of_range_value_is_rejected_and_not_stored() {
    let app = test_app();
    send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": 75 }))).await;

    let (status, _, body) = send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": 20 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _, _) = send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": 201 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, body) = send(&app, get_request("/api/heartrate")).await;
    assert_eq!(body["heartRate"], 75.0);
}

#[tokio::test]
async fn test_bounds_are_accepted() {
    let app = test_app();

    for value in [30, 200] {
        let (status, _, body) =
            send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": value }))).await;
        assert_eq!(status, StatusCode::OK, "value {} should be accepted", value);
        assert_eq!(body["data"]["heartRate"], value as f64);
    }
}

#[tokio::test]
async fn test_array_keeps_first_element() {
    let app = test_app();

    let (status, _, _) =
        send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": [82, 90] }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, body) = send(&app, get_request("/api/heartrate")).await;
    assert_eq!(body["heartRate"], 82.0);
    assert_eq!(body["sampleCount"], 2);
}

#[tokio::test]
async fn test_last_completed_post_wins() {
    let app = test_app();

    send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": 60 }))).await;
    send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": 180 }))).await;

    let (_, _, body) = send(&app, get_request("/api/heartrate")).await;
    assert_eq!(body["heartRate"], 180.0);
}

#[tokio::test]
async fn test_missing_or_malformed_values_are_bad_requests() {
    let app = test_app();

    let cases = [
        json!({}),
        json!({ "heartRate": null }),
        json!({ "heartRate": [] }),
        json!({ "heartRate": "seventy" }),
        json!({ "heartRate": 75, "timestamp": "yesterday" }),
    ];
    for case in cases {
        let (status, _, body) = send(&app, json_request(Method::POST, "/api/heartrate", case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {} should be rejected", case);
        assert_eq!(body["error"], "validation_error");
    }

    let (status, _, _) = send(&app, raw_request(Method::POST, "/api/heartrate", "{ not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, body) = send(&app, get_request("/api/heartrate")).await;
    assert_eq!(body["heartRate"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_timestamp_is_normalized_to_utc() {
    let app = test_app();

    let (status, _, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/heartrate",
            json!({ "heartRate": 64, "timestamp": "2024-05-01T10:30:00+02:00" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["timestamp"], "2024-05-01T08:30:00.000Z");
}

#[tokio::test]
async fn test_accepted_sample_is_broadcast() {
    let state = test_state();
    let (_, mut updates) = state.relay.subscribe().await;
    let app = create_app(state);

    send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": [70, 71, 72] }))).await;
    send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": 10 }))).await;

    let update = updates.recv().await.unwrap();
    assert_eq!(update.heart_rate, Some(70.0));
    assert_eq!(update.sample_count, 3);
    assert!(updates.try_recv().is_err(), "rejected samples must not be broadcast");
}

#[tokio::test]
async fn test_storage_failure_is_server_error() {
    let app = create_app(state_with(
        MockHeartRateService::with_storage_failure(),
        MockSignupService::new(),
        MockHealthService::new(),
    ));

    let (status, _, body) = send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": 75 }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");

    let (_, _, body) = send(&app, get_request("/api/heartrate")).await;
    assert_eq!(body["heartRate"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_history_pagination() {
    let app = test_app();
    for (value, minutes) in [(60, 30), (70, 20), (80, 10)] {
        let (status, _, _) = send(
            &app,
            json_request(
                Method::POST,
                "/api/heartrate",
                json!({ "heartRate": value, "timestamp": minutes_ago(minutes) }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _, body) = send(&app, get_request("/api/heartrate/history?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["heartRate"], 80.0);
    assert_eq!(body["next"], "/api/heartrate/history?range=24h&limit=2&offset=2&sort=desc");
    assert!(body.get("previous").is_none());

    let (_, _, body) = send(&app, get_request("/api/heartrate/history?limit=2&offset=2&sort=asc")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["heartRate"], 80.0);
    assert!(body.get("next").is_none());
    assert_eq!(body["previous"], "/api/heartrate/history?range=24h&limit=2&offset=0&sort=asc");
}

#[tokio::test]
async fn test_history_respects_range() {
    let readings = vec![
        HeartRateReading {
            id: "old".to_string(),
            value: 55.0,
            sample_count: 1,
            recorded_at: minutes_ago(60 * 24 * 3),
        },
        HeartRateReading {
            id: "recent".to_string(),
            value: 65.0,
            sample_count: 1,
            recorded_at: minutes_ago(5),
        },
    ];
    let app = create_app(state_with(
        MockHeartRateService::with_readings(readings),
        MockSignupService::new(),
        MockHealthService::new(),
    ));

    let (_, _, body) = send(&app, get_request("/api/heartrate/history")).await;
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["data"][0]["id"], "recent");

    let (_, _, body) = send(&app, get_request("/api/heartrate/history?range=7d")).await;
    assert_eq!(body["total_count"], 2);
}

#[tokio::test]
async fn test_history_rejects_bad_parameters() {
    let app = test_app();

    for uri in [
        "/api/heartrate/history?range=1y",
        "/api/heartrate/history?limit=0",
        "/api/heartrate/history?limit=5000",
        "/api/heartrate/history?sort=sideways",
        "/api/heartrate/history?offset=18446744073709551615",
        "/api/heartrate/history?limit=1000&offset=9223372036854775808",
    ] {
        let (status, _, body) = send(&app, get_request(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} should be rejected", uri);
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn test_history_offset_at_storage_limit_is_an_empty_page() {
    let app = test_app();
    send(&app, json_request(Method::POST, "/api/heartrate", json!({ "heartRate": 70 }))).await;

    let (status, _, body) = send(&app, get_request("/api/heartrate/history?offset=9223372036854775807")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 1);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert!(body.get("next").is_none());
    assert!(body["previous"].is_string());
}

#[tokio::test]
async fn test_epoch_millis_timestamp_is_accepted() {
    let app = test_app();

    let (status, _, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/heartrate",
            json!({ "heartRate": 64, "timestamp": 1714552200000_i64 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["timestamp"], "2024-05-01T08:30:00.000Z");

    let (status, _, _) = send(
        &app,
        json_request(Method::POST, "/api/heartrate", json!({ "heartRate": 64, "timestamp": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_cover_more_readings_than_one_page() {
    let mut readings: Vec<HeartRateReading> = (0..10_000)
        .map(|i| HeartRateReading {
            id: format!("r{}", i),
            value: 100.0,
            sample_count: 1,
            recorded_at: minutes_ago(60 + i % 600),
        })
        .collect();
    readings.push(HeartRateReading {
        id: "oldest".to_string(),
        value: 30.0,
        sample_count: 1,
        recorded_at: minutes_ago(60 * 24 * 20),
    });
    let app = create_app(state_with(
        MockHeartRateService::with_readings(readings),
        MockSignupService::new(),
        MockHealthService::new(),
    ));

    let (status, _, body) = send(&app, get_request("/api/heartrate/stats?range=all")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["readingCount"], 10_001);
    assert_eq!(body["min"], 30.0);
    assert_eq!(body["max"], 100.0);
    assert_eq!(body["current"], 100.0);

    let (_, _, body) = send(&app, get_request("/api/heartrate/stats?range=7d")).await;
    assert_eq!(body["readingCount"], 10_000);
    assert_eq!(body["min"], 100.0);
}

#[tokio::test]
async fn test_stats() {
    let app = test_app();

    let (status, _, body) = send(&app, get_request("/api/heartrate/stats")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "insufficient_data");

    for (value, minutes) in [(60, 30), (90, 20), (70, 10)] {
        send(
            &app,
            json_request(
                Method::POST,
                "/api/heartrate",
                json!({ "heartRate": value, "timestamp": minutes_ago(minutes) }),
            ),
        )
        .await;
    }

    let (status, _, body) = send(&app, get_request("/api/heartrate/stats?range=24h")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average"], 73.3);
    assert_eq!(body["min"], 60.0);
    assert_eq!(body["max"], 90.0);
    assert_eq!(body["current"], 70.0);
    assert_eq!(body["readingCount"], 3);
    assert_eq!(body["range"], "24h");
}
