use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{error, info, instrument, warn};

use health_coach_domain::entities::blood_oxygen::RecordBloodOxygenRequest;
use health_coach_domain::services::{BloodOxygenServiceError, BloodOxygenServiceTrait};

use super::query::{parse_range, HistoryWindow};
use crate::entities::blood_oxygen::{BloodOxygenReadingResponse, RecordBloodOxygenResponse};
use crate::entities::{ErrorResponse, HistoryQueryParams, ReadingStatsResponse, StatsQueryParams};

/// Service type for dependency injection
pub type BloodOxygenService = Arc<dyn BloodOxygenServiceTrait + Send + Sync>;

const HISTORY_PATH: &str = "/api/bloodoxygen/history";

fn map_service_error(err: BloodOxygenServiceError) -> ErrorResponse {
    match err {
        BloodOxygenServiceError::ValidationError(message) => ErrorResponse::validation_error(message),
        BloodOxygenServiceError::InsufficientData(message) => ErrorResponse::insufficient_data(message),
        BloodOxygenServiceError::RepositoryError(message) => {
            error!("Blood oxygen storage error: {}", message);
            ErrorResponse::internal_error("An unexpected error occurred")
        }
    }
}

/// Record a blood oxygen (SpO2) sample
#[utoipa::path(
    post,
    path = "/api/bloodoxygen",
    request_body = crate::entities::blood_oxygen::RecordBloodOxygenBody,
    responses(
        (status = 201, description = "Sample stored", body = RecordBloodOxygenResponse),
        (status = 400, description = "Missing, malformed or out of range value", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "blood_oxygen"
)]
#[instrument(skip(service, payload))]
pub async fn record_blood_oxygen(
    State(service): State<BloodOxygenService>,
    payload: Result<Json<RecordBloodOxygenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected blood oxygen body: {}", rejection.body_text());
        ErrorResponse::validation_error("spo2 must be a number")
    })?;

    let reading = service.record_sample(request).await.map_err(map_service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(RecordBloodOxygenResponse {
            message: "Blood oxygen recorded".to_string(),
            data: BloodOxygenReadingResponse::from(reading),
        }),
    ))
}

/// Stored blood oxygen readings with pagination
#[utoipa::path(
    get,
    path = "/api/bloodoxygen/history",
    params(HistoryQueryParams),
    responses(
        (status = 200, description = "Readings in the requested range",
            body = crate::entities::common::BloodOxygenHistoryResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "blood_oxygen"
)]
#[instrument(skip(service))]
pub async fn get_blood_oxygen_history(
    State(service): State<BloodOxygenService>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let window = HistoryWindow::from_params(&params)?;

    let (readings, total_count) = service
        .get_history(window.range, Some(window.limit), Some(window.offset), Some(window.sort_desc))
        .await
        .map_err(map_service_error)?;

    info!(
        "Returning {} of {} blood oxygen readings ({})",
        readings.len(),
        total_count,
        window.range
    );

    let data: Vec<BloodOxygenReadingResponse> = readings.into_iter().map(BloodOxygenReadingResponse::from).collect();
    Ok(Json(window.paginate(HISTORY_PATH, total_count, data)))
}

/// Average, minimum, maximum and current SpO2 over a range
#[utoipa::path(
    get,
    path = "/api/bloodoxygen/stats",
    params(StatsQueryParams),
    responses(
        (status = 200, description = "Statistics for the range", body = ReadingStatsResponse),
        (status = 400, description = "Invalid range", body = ErrorResponse),
        (status = 404, description = "No readings in the range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "blood_oxygen"
)]
#[instrument(skip(service))]
pub async fn get_blood_oxygen_stats(
    State(service): State<BloodOxygenService>,
    Query(params): Query<StatsQueryParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let range = parse_range(params.range.as_deref())?;

    let stats = service.get_stats(range).await.map_err(map_service_error)?;

    Ok(Json(ReadingStatsResponse::from(stats)))
}
