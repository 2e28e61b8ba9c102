use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_coach_domain::entities::blood_oxygen::BloodOxygenReading;

/// Body accepted by `POST /api/bloodoxygen`
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordBloodOxygenBody {
    /// Oxygen saturation in percent, between 50 and 100
    #[schema(example = 97.5)]
    pub spo2: f64,

    /// RFC 3339 string or epoch milliseconds, defaults to the time the request was received
    #[schema(value_type = Option<Object>, example = json!(1714552200000_i64))]
    pub timestamp: Option<serde_json::Value>,
}

/// A stored blood oxygen reading
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BloodOxygenReadingResponse {
    pub id: String,
    pub spo2: f64,
    pub recorded_at: String,
}

impl From<BloodOxygenReading> for BloodOxygenReadingResponse {
    fn from(reading: BloodOxygenReading) -> Self {
        Self {
            id: reading.id,
            spo2: reading.value,
            recorded_at: reading.recorded_at,
        }
    }
}

/// Response for an accepted sample
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordBloodOxygenResponse {
    #[schema(example = "Blood oxygen recorded")]
    pub message: String,

    pub data: BloodOxygenReadingResponse,
}
