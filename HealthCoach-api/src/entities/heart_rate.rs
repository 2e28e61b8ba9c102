use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_coach_domain::entities::heart_rate::{HeartRateReading, LatestHeartRate};

/// Body accepted by `POST /api/heartrate`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordHeartRateBody {
    /// Beats per minute, either a number or an array of numbers.
    /// For an array only the first element is kept.
    #[schema(value_type = Object, example = json!([82, 90]))]
    pub heart_rate: serde_json::Value,

    /// RFC 3339 string or epoch milliseconds, defaults to the time the request was received
    #[schema(value_type = Option<Object>, example = json!("2024-05-01T08:30:00.000Z"))]
    pub timestamp: Option<serde_json::Value>,
}

/// Response for an accepted sample
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordHeartRateResponse {
    #[schema(example = "Heart rate updated")]
    pub message: String,

    /// The sample now held as the latest value
    pub data: LatestHeartRate,
}

/// A stored reading
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateReadingResponse {
    pub id: String,
    pub heart_rate: f64,
    pub sample_count: u32,
    pub recorded_at: String,
}

impl From<HeartRateReading> for HeartRateReadingResponse {
    fn from(reading: HeartRateReading) -> Self {
        Self {
            id: reading.id,
            heart_rate: reading.value,
            sample_count: reading.sample_count,
            recorded_at: reading.recorded_at,
        }
    }
}
