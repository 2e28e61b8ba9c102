use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::entities::conversions;
use crate::entities::heart_rate::{
    HeartRateReading, LatestHeartRate, RecordHeartRateRequest, ValidatedSample, MAX_HEART_RATE, MIN_HEART_RATE,
};
use crate::entities::series::{resolve_timestamp, ReadingStats, TimeRange};
use crate::relay::SharedRelay;
use health_coach_data::repository::{HeartRateRepositoryTrait, RepositoryError};

/// Heart rate service errors
#[derive(Debug, Error)]
pub enum HeartRateServiceError {
    /// Sample rejected
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not enough readings to compute statistics
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Trait for heart rate service operations
#[async_trait]
pub trait HeartRateServiceTrait {
    /// Check a posted sample and normalize it.
    /// `received_at` is used when the sample carries no timestamp.
    fn validate_sample(
        &self,
        request: &RecordHeartRateRequest,
        received_at: DateTime<Utc>,
    ) -> Result<ValidatedSample, HeartRateServiceError>;

    /// Validate a sample, append it to the history and publish it as the latest value
    async fn record_sample(&self, request: RecordHeartRateRequest) -> Result<LatestHeartRate, HeartRateServiceError>;

    /// The most recently published sample
    async fn get_latest(&self) -> LatestHeartRate;

    /// Readings within a time range, with the total count before pagination
    async fn get_history(
        &self,
        range: TimeRange,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HeartRateReading>, usize), HeartRateServiceError>;

    /// Statistics over every reading in the range; fails when there are none
    async fn get_stats(&self, range: TimeRange) -> Result<ReadingStats, HeartRateServiceError>;
}

/// Heart rate service backed by a history repository and the live relay
pub struct HeartRateService<R: HeartRateRepositoryTrait> {
    repository: R,
    relay: SharedRelay,
}

impl<R: HeartRateRepositoryTrait> HeartRateService<R> {
    /// Create a new heart rate service
    pub fn new(repository: R, relay: SharedRelay) -> Self {
        Self { repository, relay }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> HeartRateServiceError {
        match err {
            RepositoryError::Validation(msg) => HeartRateServiceError::ValidationError(msg),
            _ => HeartRateServiceError::RepositoryError(err.to_string()),
        }
    }
}

#[async_trait]
impl<R: HeartRateRepositoryTrait + Send + Sync> HeartRateServiceTrait for HeartRateService<R> {
    fn validate_sample(
        &self,
        request: &RecordHeartRateRequest,
        received_at: DateTime<Utc>,
    ) -> Result<ValidatedSample, HeartRateServiceError> {
        let heart_rate = request
            .heart_rate
            .as_ref()
            .ok_or_else(|| HeartRateServiceError::ValidationError("heartRate is required".to_string()))?;

        let value = heart_rate.primary().ok_or_else(|| {
            HeartRateServiceError::ValidationError("heartRate must contain at least one sample".to_string())
        })?;

        if !value.is_finite() || !(MIN_HEART_RATE..=MAX_HEART_RATE).contains(&value) {
            return Err(HeartRateServiceError::ValidationError(format!(
                "heartRate must be between {} and {}",
                MIN_HEART_RATE, MAX_HEART_RATE
            )));
        }

        let timestamp = resolve_timestamp(request.timestamp.as_ref(), received_at)
            .map_err(HeartRateServiceError::ValidationError)?;

        Ok(ValidatedSample {
            value,
            sample_count: heart_rate.sample_count(),
            timestamp,
        })
    }

    async fn record_sample(&self, request: RecordHeartRateRequest) -> Result<LatestHeartRate, HeartRateServiceError> {
        let sample = self.validate_sample(&request, Utc::now()).map_err(|e| {
            warn!("Rejected heart rate sample: {}", e);
            e
        })?;

        self.repository
            .create(conversions::convert_to_data_reading(&sample))
            .await
            .map_err(|e| {
                error!("Failed to store heart rate reading: {}", e);
                self.map_repo_error(e)
            })?;

        let latest = self.relay.publish(LatestHeartRate::from(&sample)).await;
        info!(
            "Heart rate updated: {} bpm at {} ({} sample(s))",
            sample.value, sample.timestamp, sample.sample_count
        );

        Ok(latest)
    }

    async fn get_latest(&self) -> LatestHeartRate {
        self.relay.latest().await
    }

    async fn get_history(
        &self,
        range: TimeRange,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HeartRateReading>, usize), HeartRateServiceError> {
        let (records, total) = self
            .repository
            .get_filtered(range.start_filter(), None, limit, offset, sort_desc)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let readings = records.into_iter().map(conversions::convert_to_domain_reading).collect();

        Ok((readings, total))
    }

    async fn get_stats(&self, range: TimeRange) -> Result<ReadingStats, HeartRateServiceError> {
        let summary = self
            .repository
            .get_summary(range.start_filter())
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| {
                HeartRateServiceError::InsufficientData(format!("No heart rate readings in the last {}", range))
            })?;

        Ok(conversions::convert_to_domain_stats(summary, range))
    }
}

/// Create a heart rate service using the repository from the data layer
pub fn create_default_heart_rate_service(relay: SharedRelay) -> impl HeartRateServiceTrait + Send + Sync {
    let repository = health_coach_data::repository::HeartRateRepository::new();
    HeartRateService::new(repository, relay)
}
