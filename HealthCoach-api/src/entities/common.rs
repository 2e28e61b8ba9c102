use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use health_coach_domain::entities::series::ReadingStats;

use super::blood_oxygen::BloodOxygenReadingResponse;
use super::heart_rate::HeartRateReadingResponse;

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a not found error response
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    /// Create a validation error response
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create a bad request error response
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    /// Create an unauthorized error response
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }

    /// Not enough stored readings to answer the query
    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new("insufficient_data", message)
    }

    /// Create an internal error response
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    /// Attach structured details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// HTTP status for this error code
    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" | "insufficient_data" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Paginated response for stored readings
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    HeartRateHistoryResponse = PaginatedResponse<HeartRateReadingResponse>,
    BloodOxygenHistoryResponse = PaginatedResponse<BloodOxygenReadingResponse>
)]
pub struct PaginatedResponse<T> {
    /// Total count of items available
    pub total_count: usize,

    /// Current offset
    pub offset: usize,

    /// Current limit
    pub limit: usize,

    /// URL for the next page (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// URL for the previous page (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,

    /// Actual data items
    pub data: Vec<T>,
}

/// Query parameters for retrieving a reading history
#[derive(Debug, Deserialize, Clone, Default, IntoParams, ToSchema)]
pub struct HistoryQueryParams {
    /// Time range: 24h, 7d, 30d or all (default: 24h)
    pub range: Option<String>,

    /// Maximum number of results (default: 100, max: 1000)
    pub limit: Option<usize>,

    /// Pagination offset (default: 0)
    pub offset: Option<usize>,

    /// Sort direction (asc/desc, default: desc)
    pub sort: Option<String>,
}

/// Query parameters for reading statistics
#[derive(Debug, Deserialize, Default, IntoParams, ToSchema)]
pub struct StatsQueryParams {
    /// Time range: 24h, 7d, 30d or all (default: 24h)
    pub range: Option<String>,
}

/// Summary statistics over a time range
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStatsResponse {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Most recent reading in the range
    pub current: f64,
    pub reading_count: usize,
    #[schema(example = "24h")]
    pub range: String,
}

impl From<ReadingStats> for ReadingStatsResponse {
    fn from(stats: ReadingStats) -> Self {
        Self {
            average: stats.average,
            min: stats.min,
            max: stats.max,
            current: stats.current,
            reading_count: stats.reading_count,
            range: stats.range.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_error_code() {
        assert_eq!(ErrorResponse::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorResponse::insufficient_data("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorResponse::validation_error("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorResponse::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorResponse::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorResponse::internal_error("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_details_are_omitted_when_empty() {
        let body = serde_json::to_value(ErrorResponse::bad_request("Broken body")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "bad_request", "message": "Broken body" }));

        let body = serde_json::to_value(
            ErrorResponse::validation_error("Bad").with_details(serde_json::json!({ "field": "heartRate" })),
        )
        .unwrap();
        assert_eq!(body["details"]["field"], "heartRate");
    }
}
