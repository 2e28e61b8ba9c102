use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{error, info, instrument, warn};

use health_coach_domain::entities::heart_rate::RecordHeartRateRequest;
use health_coach_domain::services::{HeartRateServiceError, HeartRateServiceTrait};

use super::query::{parse_range, HistoryWindow};
use crate::entities::heart_rate::{HeartRateReadingResponse, RecordHeartRateResponse};
use crate::entities::{ErrorResponse, HistoryQueryParams, ReadingStatsResponse, StatsQueryParams};

/// Service type for dependency injection
pub type HeartRateService = Arc<dyn HeartRateServiceTrait + Send + Sync>;

const HISTORY_PATH: &str = "/api/heartrate/history";

fn map_service_error(err: HeartRateServiceError) -> ErrorResponse {
    match err {
        HeartRateServiceError::ValidationError(message) => ErrorResponse::validation_error(message),
        HeartRateServiceError::InsufficientData(message) => ErrorResponse::insufficient_data(message),
        HeartRateServiceError::RepositoryError(message) => {
            error!("Heart rate storage error: {}", message);
            ErrorResponse::internal_error("An unexpected error occurred")
        }
    }
}

/// Record a heart rate sample and push it to live subscribers
#[utoipa::path(
    post,
    path = "/api/heartrate",
    request_body = crate::entities::heart_rate::RecordHeartRateBody,
    responses(
        (status = 200, description = "Sample accepted and broadcast", body = RecordHeartRateResponse),
        (status = 400, description = "Missing, malformed or out of range value", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "heart_rate"
)]
#[instrument(skip(service, payload))]
pub async fn record_heart_rate(
    State(service): State<HeartRateService>,
    payload: Result<Json<RecordHeartRateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected heart rate body: {}", rejection.body_text());
        ErrorResponse::validation_error("heartRate must be a number or an array of numbers")
    })?;

    let latest = service.record_sample(request).await.map_err(map_service_error)?;

    Ok((
        StatusCode::OK,
        Json(RecordHeartRateResponse {
            message: "Heart rate updated".to_string(),
            data: latest,
        }),
    ))
}

/// Latest heart rate sample
#[utoipa::path(
    get,
    path = "/api/heartrate",
    responses(
        (status = 200, description = "Most recent sample, nulls before the first one",
            body = health_coach_domain::entities::heart_rate::LatestHeartRate),
    ),
    tag = "heart_rate"
)]
#[instrument(skip(service))]
pub async fn get_latest_heart_rate(State(service): State<HeartRateService>) -> impl IntoResponse {
    let latest = service.get_latest().await;
    ([(header::CACHE_CONTROL, "no-store")], Json(latest))
}

/// Stored heart rate readings with pagination
#[utoipa::path(
    get,
    path = "/api/heartrate/history",
    params(HistoryQueryParams),
    responses(
        (status = 200, description = "Readings in the requested range",
            body = crate::entities::common::HeartRateHistoryResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "heart_rate"
)]
#[instrument(skip(service))]
pub async fn get_heart_rate_history(
    State(service): State<HeartRateService>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let window = HistoryWindow::from_params(&params)?;

    let (readings, total_count) = service
        .get_history(window.range, Some(window.limit), Some(window.offset), Some(window.sort_desc))
        .await
        .map_err(map_service_error)?;

    info!(
        "Returning {} of {} heart rate readings ({})",
        readings.len(),
        total_count,
        window.range
    );

    let data: Vec<HeartRateReadingResponse> = readings.into_iter().map(HeartRateReadingResponse::from).collect();
    Ok(Json(window.paginate(HISTORY_PATH, total_count, data)))
}

/// Average, minimum, maximum and current heart rate over a range
#[utoipa::path(
    get,
    path = "/api/heartrate/stats",
    params(StatsQueryParams),
    responses(
        (status = 200, description = "Statistics for the range", body = ReadingStatsResponse),
        (status = 400, description = "Invalid range", body = ErrorResponse),
        (status = 404, description = "No readings in the range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "heart_rate"
)]
#[instrument(skip(service))]
pub async fn get_heart_rate_stats(
    State(service): State<HeartRateService>,
    Query(params): Query<StatsQueryParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let range = parse_range(params.range.as_deref())?;

    let stats = service.get_stats(range).await.map_err(map_service_error)?;

    Ok(Json(ReadingStatsResponse::from(stats)))
}
