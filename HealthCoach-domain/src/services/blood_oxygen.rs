use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::entities::blood_oxygen::{BloodOxygenReading, RecordBloodOxygenRequest, MAX_BLOOD_OXYGEN, MIN_BLOOD_OXYGEN};
use crate::entities::conversions;
use crate::entities::series::{resolve_timestamp, ReadingStats, TimeRange};
use health_coach_data::repository::{BloodOxygenRepositoryTrait, RepositoryError};

#[derive(Debug, Error)]
pub enum BloodOxygenServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Trait for blood oxygen service operations
#[async_trait]
pub trait BloodOxygenServiceTrait {
    /// Check a posted sample and return its value and normalized timestamp
    fn validate_sample(
        &self,
        request: &RecordBloodOxygenRequest,
        received_at: DateTime<Utc>,
    ) -> Result<(f64, String), BloodOxygenServiceError>;

    /// Validate a sample and append it to the history
    async fn record_sample(&self, request: RecordBloodOxygenRequest)
        -> Result<BloodOxygenReading, BloodOxygenServiceError>;

    /// Readings within a time range, with the total count before pagination
    async fn get_history(
        &self,
        range: TimeRange,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<BloodOxygenReading>, usize), BloodOxygenServiceError>;

    /// Statistics over every reading in the range; `current` is the newest reading
    async fn get_stats(&self, range: TimeRange) -> Result<ReadingStats, BloodOxygenServiceError>;
}

/// Blood oxygen service backed by a history repository
pub struct BloodOxygenService<R: BloodOxygenRepositoryTrait> {
    repository: R,
}

impl<R: BloodOxygenRepositoryTrait> BloodOxygenService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn map_repo_error(&self, err: RepositoryError) -> BloodOxygenServiceError {
        match err {
            RepositoryError::Validation(msg) => BloodOxygenServiceError::ValidationError(msg),
            _ => BloodOxygenServiceError::RepositoryError(err.to_string()),
        }
    }
}

#[async_trait]
impl<R: BloodOxygenRepositoryTrait + Send + Sync> BloodOxygenServiceTrait for BloodOxygenService<R> {
    fn validate_sample(
        &self,
        request: &RecordBloodOxygenRequest,
        received_at: DateTime<Utc>,
    ) -> Result<(f64, String), BloodOxygenServiceError> {
        let value = request
            .spo2
            .ok_or_else(|| BloodOxygenServiceError::ValidationError("spo2 is required".to_string()))?;

        if !value.is_finite() || !(MIN_BLOOD_OXYGEN..=MAX_BLOOD_OXYGEN).contains(&value) {
            return Err(BloodOxygenServiceError::ValidationError(format!(
                "spo2 must be between {} and {} percent",
                MIN_BLOOD_OXYGEN, MAX_BLOOD_OXYGEN
            )));
        }

        let timestamp = resolve_timestamp(request.timestamp.as_ref(), received_at)
            .map_err(BloodOxygenServiceError::ValidationError)?;

        Ok((value, timestamp))
    }

    async fn record_sample(
        &self,
        request: RecordBloodOxygenRequest,
    ) -> Result<BloodOxygenReading, BloodOxygenServiceError> {
        let (value, timestamp) = self.validate_sample(&request, Utc::now()).map_err(|e| {
            warn!("Rejected blood oxygen sample: {}", e);
            e
        })?;

        let record = self
            .repository
            .create(conversions::convert_to_data_blood_oxygen(value, timestamp))
            .await
            .map_err(|e| {
                error!("Failed to store blood oxygen reading: {}", e);
                self.map_repo_error(e)
            })?;

        info!("Blood oxygen recorded: {}% at {}", record.value, record.recorded_at);

        Ok(conversions::convert_to_domain_blood_oxygen(record))
    }

    async fn get_history(
        &self,
        range: TimeRange,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<BloodOxygenReading>, usize), BloodOxygenServiceError> {
        let (records, total) = self
            .repository
            .get_filtered(range.start_filter(), None, limit, offset, sort_desc)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let readings = records
            .into_iter()
            .map(conversions::convert_to_domain_blood_oxygen)
            .collect();

        Ok((readings, total))
    }

    async fn get_stats(&self, range: TimeRange) -> Result<ReadingStats, BloodOxygenServiceError> {
        let summary = self
            .repository
            .get_summary(range.start_filter())
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| {
                BloodOxygenServiceError::InsufficientData(format!("No blood oxygen readings in the last {}", range))
            })?;

        Ok(conversions::convert_to_domain_stats(summary, range))
    }
}

/// Create a blood oxygen service using the repository from the data layer
pub fn create_default_blood_oxygen_service() -> impl BloodOxygenServiceTrait + Send + Sync {
    BloodOxygenService::new(health_coach_data::repository::BloodOxygenRepository::new())
}
