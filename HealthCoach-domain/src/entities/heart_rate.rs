use serde::{Deserialize, Serialize};

use super::series::SampleTimestamp;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Lowest heart rate (beats per minute) accepted from a device
pub const MIN_HEART_RATE: f64 = 30.0;

/// Highest heart rate (beats per minute) accepted from a device
pub const MAX_HEART_RATE: f64 = 200.0;

/// Heart rate as posted by a device: a single value or a batch of samples.
/// Only the first sample of a batch is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HeartRateValue {
    /// A single sample
    Single(f64),
    /// Several samples sent together
    Batch(Vec<f64>),
}

impl HeartRateValue {
    /// The sample that becomes the latest value
    pub fn primary(&self) -> Option<f64> {
        match self {
            HeartRateValue::Single(value) => Some(*value),
            HeartRateValue::Batch(values) => values.first().copied(),
        }
    }

    /// Number of samples carried by the request
    pub fn sample_count(&self) -> u32 {
        match self {
            HeartRateValue::Single(_) => 1,
            HeartRateValue::Batch(values) => values.len() as u32,
        }
    }
}

/// Incoming heart rate sample
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordHeartRateRequest {
    /// Beats per minute, either a number or an array of numbers
    #[serde(default)]
    pub heart_rate: Option<HeartRateValue>,

    /// When the sample was taken. Defaults to the time of receipt.
    #[serde(default)]
    pub timestamp: Option<SampleTimestamp>,
}

/// A sample that passed validation, with its timestamp normalized to UTC
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSample {
    /// Beats per minute
    pub value: f64,
    /// Number of samples in the originating request
    pub sample_count: u32,
    /// RFC 3339 timestamp in UTC with millisecond precision
    pub timestamp: String,
}

/// The single most recent sample held by the relay.
/// Serializes as `{heartRate, timestamp, sampleCount}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LatestHeartRate {
    /// Beats per minute, null before the first accepted sample
    pub heart_rate: Option<f64>,
    /// Timestamp of the sample, null before the first accepted sample
    pub timestamp: Option<String>,
    /// Number of samples in the request that produced this value
    pub sample_count: u32,
}

impl From<&ValidatedSample> for LatestHeartRate {
    fn from(sample: &ValidatedSample) -> Self {
        Self {
            heart_rate: Some(sample.value),
            timestamp: Some(sample.timestamp.clone()),
            sample_count: sample.sample_count,
        }
    }
}

/// A stored heart rate reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HeartRateReading {
    /// Unique identifier for the reading
    pub id: String,
    /// Beats per minute
    pub value: f64,
    /// Number of samples in the request that produced this reading
    pub sample_count: u32,
    /// When the reading was taken
    pub recorded_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_deserializes_from_number_or_array() {
        let single: RecordHeartRateRequest = serde_json::from_str(r#"{"heartRate": 75}"#).unwrap();
        assert_eq!(single.heart_rate, Some(HeartRateValue::Single(75.0)));

        let batch: RecordHeartRateRequest = serde_json::from_str(r#"{"heartRate": [82, 90.5]}"#).unwrap();
        let value = batch.heart_rate.unwrap();
        assert_eq!(value.primary(), Some(82.0));
        assert_eq!(value.sample_count(), 2);

        let missing: RecordHeartRateRequest = serde_json::from_str(r#"{"timestamp": "2024-01-01T00:00:00Z"}"#).unwrap();
        assert!(missing.heart_rate.is_none());

        let epoch: RecordHeartRateRequest = serde_json::from_str(r#"{"heartRate": 70, "timestamp": 1714552200000}"#).unwrap();
        assert_eq!(epoch.timestamp, Some(SampleTimestamp::EpochMillis(1_714_552_200_000)));

        assert!(serde_json::from_str::<RecordHeartRateRequest>(r#"{"heartRate": "fast"}"#).is_err());
    }

    #[test]
    fn test_empty_batch_has_no_primary_value() {
        let value = HeartRateValue::Batch(vec![]);
        assert_eq!(value.primary(), None);
        assert_eq!(value.sample_count(), 0);
    }

    #[test]
    fn test_latest_serializes_in_camel_case() {
        let json = serde_json::to_value(LatestHeartRate::default()).unwrap();
        assert_eq!(json, serde_json::json!({"heartRate": null, "timestamp": null, "sampleCount": 0}));
    }
}
