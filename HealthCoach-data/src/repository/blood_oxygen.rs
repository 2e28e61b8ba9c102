use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::database::{get_db_pool, DatabasePool};
use crate::models::blood_oxygen::{BloodOxygenRecord, NewBloodOxygenRecord};
use crate::models::series::ReadingSummary;
use super::errors::RepositoryError;
use super::in_memory::InMemorySeriesStorage;
use super::storage::DatabaseStorage;

/// Repository trait for blood oxygen history
#[async_trait]
pub trait BloodOxygenRepositoryTrait {
    /// Append a reading to the history
    async fn create(&self, reading: NewBloodOxygenRecord) -> Result<BloodOxygenRecord, RepositoryError>;

    /// Get filtered readings and the total number of matches before pagination
    async fn get_filtered(
        &self,
        start_date: Option<String>,
        end_date: Option<String>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<BloodOxygenRecord>, usize), RepositoryError>;

    /// Aggregates over every reading at or after `start_date`
    async fn get_summary(&self, start_date: Option<String>) -> Result<Option<ReadingSummary>, RepositoryError>;
}

/// Repository for blood oxygen readings, SQLite when available and in-memory otherwise
#[derive(Debug, Clone, Default)]
pub struct BloodOxygenRepository {
    pool: Option<DatabasePool>,
    storage: InMemorySeriesStorage<BloodOxygenRecord>,
}

impl BloodOxygenRepository {
    pub fn new() -> Self {
        let pool = match get_db_pool() {
            Ok(pool) => Some(pool),
            Err(e) => {
                debug!("Database not available ({}), blood oxygen history will be kept in memory", e);
                None
            }
        };

        Self {
            pool,
            storage: InMemorySeriesStorage::new(),
        }
    }

    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            pool: Some(pool),
            storage: InMemorySeriesStorage::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BloodOxygenRepositoryTrait for BloodOxygenRepository {
    async fn create(&self, reading: NewBloodOxygenRecord) -> Result<BloodOxygenRecord, RepositoryError> {
        let record = BloodOxygenRecord {
            id: Uuid::new_v4().to_string(),
            value: reading.value,
            recorded_at: reading.recorded_at,
        };

        match &self.pool {
            Some(pool) => {
                let pool = pool.clone();
                let to_store = record.clone();
                tokio::task::spawn_blocking(move || DatabaseStorage::insert_blood_oxygen(&pool, &to_store)).await??;
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
    ) -> Result<(Vec<BloodOxygenRecord>, usize), RepositoryError> {
        match &self.pool {
            Some(pool) => {
                let pool = pool.clone();
                tokio::task::spawn_blocking(move || {
                    DatabaseStorage::get_filtered_blood_oxygen(
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
                tokio::task::spawn_blocking(move || {
                    DatabaseStorage::get_blood_oxygen_summary(&pool, start_date.as_deref())
                })
                .await?
            }
            None => self.storage.get_summary(start_date.as_deref()),
        }
    }
}

/// Mock blood oxygen repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use crate::models::series;
    use std::sync::Mutex;

    /// In-memory blood oxygen repository with optional failure injection
    #[derive(Default)]
    pub struct MockBloodOxygenRepository {
        readings: Mutex<Vec<BloodOxygenRecord>>,
        fail_all: bool,
    }

    impl MockBloodOxygenRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_readings(readings: Vec<BloodOxygenRecord>) -> Self {
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
    impl BloodOxygenRepositoryTrait for MockBloodOxygenRepository {
        async fn create(&self, reading: NewBloodOxygenRecord) -> Result<BloodOxygenRecord, RepositoryError> {
            self.check()?;
            let record = BloodOxygenRecord {
                id: Uuid::new_v4().to_string(),
                value: reading.value,
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
        ) -> Result<(Vec<BloodOxygenRecord>, usize), RepositoryError> {
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
