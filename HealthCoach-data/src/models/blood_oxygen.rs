use serde::{Deserialize, Serialize};

use super::series::SeriesRecord;

/// Storage model for a blood oxygen (SpO2) reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BloodOxygenRecord {
    pub id: String,

    /// Saturation in percent
    pub value: f64,

    /// When the reading was taken (RFC 3339)
    pub recorded_at: String,
}

impl SeriesRecord for BloodOxygenRecord {
    fn value(&self) -> f64 {
        self.value
    }

    fn recorded_at(&self) -> &str {
        &self.recorded_at
    }
}

/// Input data for appending a blood oxygen reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBloodOxygenRecord {
    pub value: f64,
    pub recorded_at: String,
}
