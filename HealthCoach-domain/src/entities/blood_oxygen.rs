use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::series::SampleTimestamp;

/// Lowest oxygen saturation (percent) accepted from a device
pub const MIN_BLOOD_OXYGEN: f64 = 50.0;

/// Highest oxygen saturation (percent) accepted from a device
pub const MAX_BLOOD_OXYGEN: f64 = 100.0;

/// Incoming blood oxygen sample
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordBloodOxygenRequest {
    /// Oxygen saturation in percent
    #[serde(default)]
    pub spo2: Option<f64>,

    /// When the sample was taken. Defaults to the time of receipt.
    #[serde(default)]
    pub timestamp: Option<SampleTimestamp>,
}

/// A stored blood oxygen reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BloodOxygenReading {
    pub id: String,
    /// Oxygen saturation in percent
    pub value: f64,
    pub recorded_at: String,
}
