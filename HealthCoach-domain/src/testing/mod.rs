// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use health_coach_data::repository::mock::{MockBloodOxygenRepository, MockHeartRateRepository, MockUserRepository};

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::TokenConfig;
use crate::entities::blood_oxygen::{BloodOxygenReading, RecordBloodOxygenRequest};
use crate::entities::heart_rate::{HeartRateReading, LatestHeartRate, RecordHeartRateRequest, ValidatedSample};
use crate::entities::series::{ReadingStats, TimeRange};
use crate::entities::user::{AuthSession, LoginRequest, SignupRequest, User};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth};
use crate::relay::{HeartRateRelay, SharedRelay, DEFAULT_CHANNEL_CAPACITY};
use crate::services::blood_oxygen::{BloodOxygenService, BloodOxygenServiceError, BloodOxygenServiceTrait};
use crate::services::heart_rate::{HeartRateService, HeartRateServiceError, HeartRateServiceTrait};
use crate::services::signup::{SignupService, SignupServiceError, SignupServiceTrait};

/// Secret used by [`MockSignupService`] to sign tokens
pub const MOCK_TOKEN_SECRET: &str = "mock-token-secret";

/// Token configuration matching the tokens issued by [`MockSignupService`]
pub fn mock_token_config() -> TokenConfig {
    TokenConfig::new(MOCK_TOKEN_SECRET)
}

/// Signup service over an in-memory mock repository
pub struct MockSignupService {
    inner: SignupService<MockUserRepository>,
}

impl Default for MockSignupService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSignupService {
    /// Create a mock service with no registered users
    pub fn new() -> Self {
        Self {
            inner: SignupService::new(MockUserRepository::new(), mock_token_config()),
        }
    }

    /// Create a mock service whose storage fails on every call
    pub fn with_storage_failure() -> Self {
        Self {
            inner: SignupService::new(MockUserRepository::failing(), mock_token_config()),
        }
    }
}

#[async_trait]
impl SignupServiceTrait for MockSignupService {
    fn validate_signup_request(&self, request: &SignupRequest) -> Result<(), SignupServiceError> {
        self.inner.validate_signup_request(request)
    }

    async fn register(&self, request: SignupRequest) -> Result<AuthSession, SignupServiceError> {
        self.inner.register(request).await
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthSession, SignupServiceError> {
        self.inner.login(request).await
    }

    async fn get_user(&self, id: &str) -> Result<User, SignupServiceError> {
        self.inner.get_user(id).await
    }
}

/// Heart rate service over an in-memory mock repository, exposing its relay
pub struct MockHeartRateService {
    inner: HeartRateService<MockHeartRateRepository>,
    relay: SharedRelay,
}

impl Default for MockHeartRateService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHeartRateService {
    /// Create a mock service with an empty history and a fresh relay
    pub fn new() -> Self {
        Self::with_repository(MockHeartRateRepository::new(), HeartRateRelay::shared(DEFAULT_CHANNEL_CAPACITY))
    }

    /// Create a mock service that publishes to an existing relay
    pub fn with_relay(relay: SharedRelay) -> Self {
        Self::with_repository(MockHeartRateRepository::new(), relay)
    }

    /// Create a mock service whose history storage fails on every call
    pub fn with_storage_failure() -> Self {
        Self::with_repository(
            MockHeartRateRepository::failing(),
            HeartRateRelay::shared(DEFAULT_CHANNEL_CAPACITY),
        )
    }

    /// Create a mock service with preloaded history readings
    pub fn with_readings(readings: Vec<HeartRateReading>) -> Self {
        let records = readings
            .into_iter()
            .map(|r| health_coach_data::models::heart_rate::HeartRateRecord {
                id: r.id,
                value: r.value,
                sample_count: r.sample_count,
                recorded_at: r.recorded_at,
            })
            .collect();
        Self::with_repository(
            MockHeartRateRepository::with_readings(records),
            HeartRateRelay::shared(DEFAULT_CHANNEL_CAPACITY),
        )
    }

    fn with_repository(repository: MockHeartRateRepository, relay: SharedRelay) -> Self {
        Self {
            inner: HeartRateService::new(repository, relay.clone()),
            relay,
        }
    }

    /// The relay this service publishes to
    pub fn relay(&self) -> SharedRelay {
        self.relay.clone()
    }
}

#[async_trait]
impl HeartRateServiceTrait for MockHeartRateService {
    fn validate_sample(
        &self,
        request: &RecordHeartRateRequest,
        received_at: DateTime<Utc>,
    ) -> Result<ValidatedSample, HeartRateServiceError> {
        self.inner.validate_sample(request, received_at)
    }

    async fn record_sample(&self, request: RecordHeartRateRequest) -> Result<LatestHeartRate, HeartRateServiceError> {
        self.inner.record_sample(request).await
    }

    async fn get_latest(&self) -> LatestHeartRate {
        self.inner.get_latest().await
    }

    async fn get_history(
        &self,
        range: TimeRange,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HeartRateReading>, usize), HeartRateServiceError> {
        self.inner.get_history(range, limit, offset, sort_desc).await
    }

    async fn get_stats(&self, range: TimeRange) -> Result<ReadingStats, HeartRateServiceError> {
        self.inner.get_stats(range).await
    }
}

/// Blood oxygen service over an in-memory mock repository
pub struct MockBloodOxygenService {
    inner: BloodOxygenService<MockBloodOxygenRepository>,
}

impl Default for MockBloodOxygenService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBloodOxygenService {
    pub fn new() -> Self {
        Self {
            inner: BloodOxygenService::new(MockBloodOxygenRepository::new()),
        }
    }

    /// Create a mock service whose storage fails on every call
    pub fn with_storage_failure() -> Self {
        Self {
            inner: BloodOxygenService::new(MockBloodOxygenRepository::failing()),
        }
    }

    /// Create a mock service with preloaded readings
    pub fn with_readings(readings: Vec<BloodOxygenReading>) -> Self {
        let records = readings
            .into_iter()
            .map(|r| health_coach_data::models::blood_oxygen::BloodOxygenRecord {
                id: r.id,
                value: r.value,
                recorded_at: r.recorded_at,
            })
            .collect();
        Self {
            inner: BloodOxygenService::new(MockBloodOxygenRepository::with_readings(records)),
        }
    }
}

#[async_trait]
impl BloodOxygenServiceTrait for MockBloodOxygenService {
    fn validate_sample(
        &self,
        request: &RecordBloodOxygenRequest,
        received_at: DateTime<Utc>,
    ) -> Result<(f64, String), BloodOxygenServiceError> {
        self.inner.validate_sample(request, received_at)
    }

    async fn record_sample(
        &self,
        request: RecordBloodOxygenRequest,
    ) -> Result<BloodOxygenReading, BloodOxygenServiceError> {
        self.inner.record_sample(request).await
    }

    async fn get_history(
        &self,
        range: TimeRange,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<BloodOxygenReading>, usize), BloodOxygenServiceError> {
        self.inner.get_history(range, limit, offset, sort_desc).await
    }

    async fn get_stats(&self, range: TimeRange) -> Result<ReadingStats, BloodOxygenServiceError> {
        self.inner.get_stats(range).await
    }
}

/// Mock implementation of the health service
#[derive(Debug)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with a degraded database
    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();

        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("No database configured, data is kept in memory".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );
        components
            .entry("relay".to_string())
            .or_insert(HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some("0 subscriber(s)".to_string()),
            });

        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}
