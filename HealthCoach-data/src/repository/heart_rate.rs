use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::database::{get_db_pool, DatabasePool};
use crate::models::heart_rate::{HeartRateRecord, NewHeartRateRecord};
use crate::models::series::ReadingSummary;
use super::errors::RepositoryError;
use super::in_memory::InMemorySeriesStorage;
use super::storage::DatabaseStorage;

/// Repository trait for heart rate history
#[async_trait]
pub trait HeartRateRepositoryTrait {
    /// Append a reading to the history
    async fn create(&self, reading: NewHeartRateRecord) -> Result<HeartRateRecord, RepositoryError>;

    /// Get filtered readings and the total number of matches before pagination
    async fn get_filtered(
        &self,
        start_date: Option<String>,
        end_date: Option<String>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HeartRateRecord>, usize), RepositoryError>;

    /// Count, average, min, max and newest value of every reading at or after `start_date`
    async fn get_summary(&self, start_date: Option<String>) -> Result<Option<ReadingSummary>, RepositoryError>;
}

/// Repository for heart rate readings.
/// Uses the SQLite pool when one is available, in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct HeartRateRepository {
    pool: Option<DatabasePool>,
    storage: InMemorySeriesStorage<HeartRateRecord>,
}

impl HeartRateRepository {
    /// Create a repository bound to the global pool, if it has been initialized
    pub fn new() -> Self {
        let pool = match get_db_pool() {
            Ok(pool) => Some(pool),
            Err(e) => {
                debug!("Database not available ({}), heart rate history will be kept in memory", e);
                None
            }
        };

        Self {
            pool,
            storage: InMemorySeriesStorage::new(),
        }
    }

    /// Create a repository bound to a specific pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            pool: Some(pool),
            storage: InMemorySeriesStorage::new(),
        }
    }

    /// Create a repository that only uses in-memory storage
    pub fn in_memory() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HeartRateRepositoryTrait for HeartRateRepository {
    async fn create(&self, reading: NewHeartRateRecord) -> Result<HeartRateRecord, RepositoryError> {
        let record = HeartRateRecord {
            id: Uuid::new_v4().to_string(),
            value: reading.value,
            sample_count: reading.sample_count,
            recorded_at: reading.recorded_at,
        };

        match &self.pool {
            Some(pool) => {
                let pool = pool.clone();
                let to_store = record.clone();
                tokio::task::spawn_blocking(move || DatabaseStorage::insert_reading(&pool, &to_store)).await??;
                Ok(record)
            }
            None => self.storage.insert(&record),
        }
    }

    async fn get_filtered(
        &self,
        start_date: Option<String>,
        end_date: Option<String>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HeartRateRecord>, usize), RepositoryError> {
        match &self.pool {
            Some(pool) => {
                let pool = pool.clone();
                tokio::task::spawn_blocking(move || {
                    DatabaseStorage::get_filtered_readings(
                        &pool,
                        start_date.as_deref(),
                        end_date.as_deref(),
                        limit,
                        offset,
                        sort_desc,
                    )
                })
                .await?
            }
            None => self.storage.get_filtered(start_date.as_deref(), end_date.as_deref(), limit, offset, sort_desc),
        }
    }

    async fn get_summary(&self, start_date: Option<String>) -> Result<Option<ReadingSummary>, RepositoryError> {
        match &self.pool {
            Some(pool) => {
                let pool = pool.clone();
                tokio::task::spawn_blocking(move || DatabaseStorage::get_reading_summary(&pool, start_date.as_deref()))
                    .await?
            }
            None => self.storage.get_summary(start_date.as_deref()),
        }
    }
}

/// Mock heart rate repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use crate::models::series;
    use std::sync::Mutex;

    /// Mock implementation of HeartRateRepository with optional failure injection
    #[derive(Default)]
    pub struct MockHeartRateRepository {
        readings: Mutex<Vec<HeartRateRecord>>,
        fail_all: bool,
    }

    impl MockHeartRateRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined readings
        pub fn with_readings(readings: Vec<HeartRateRecord>) -> Self {
            Self {
                readings: Mutex::new(readings),
                fail_all: false,
            }
        }

        /// Make every call fail with a storage error
        pub fn failing() -> Self {
            Self {
                readings: Mutex::new(Vec::new()),
                fail_all: true,
            }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.fail_all {
                Err(RepositoryError::Task("mock repository is configured to fail".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl HeartRateRepositoryTrait for MockHeartRateRepository {
        async fn create(&self, reading: NewHeartRateRecord) -> Result<HeartRateRecord, RepositoryError> {
            self.check()?;
            let record = HeartRateRecord {
                id: Uuid::new_v4().to_string(),
                value: reading.value,
                sample_count: reading.sample_count,
                recorded_at: reading.recorded_at,
            };
            self.readings.lock()?.push(record.clone());
            Ok(record)
        }

        async fn get_filtered(
            &self,
            start_date: Option<String>,
            end_date: Option<String>,
            limit: Option<usize>,
            offset: Option<usize>,
            sort_desc: Option<bool>,
        ) -> Result<(Vec<HeartRateRecord>, usize), RepositoryError> {
            self.check()?;
            let readings = self.readings.lock()?;
            Ok(series::select_page(
                &readings,
                start_date.as_deref(),
                end_date.as_deref(),
                limit,
                offset,
                sort_desc,
            ))
        }

        async fn get_summary(&self, start_date: Option<String>) -> Result<Option<ReadingSummary>, RepositoryError> {
            self.check()?;
            let readings = self.readings.lock()?;
            Ok(series::summarize(&readings, start_date.as_deref()))
        }
    }
}
