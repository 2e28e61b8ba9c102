use serde::{Deserialize, Serialize};

use super::series::SeriesRecord;

/// Storage model for a heart rate reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeartRateRecord {
    /// Unique identifier for the reading
    pub id: String,

    /// Beats per minute
    pub value: f64,

    /// Number of samples carried by the request that produced this reading
    pub sample_count: u32,

    /// When the reading was taken (RFC 3339)
    pub recorded_at: String,
}

impl SeriesRecord for HeartRateRecord {
    fn value(&self) -> f64 {
        self.value
    }

    fn recorded_at(&self) -> &str {
        &self.recorded_at
    }
}

/// Input data for appending a heart rate reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHeartRateRecord {
    /// Beats per minute
    pub value: f64,

    /// Number of samples carried by the originating request
    pub sample_count: u32,

    /// When the reading was taken (RFC 3339)
    pub recorded_at: String,
}
