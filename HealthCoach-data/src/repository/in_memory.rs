use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::heart_rate::HeartRateRecord;
use crate::models::series::{self, ReadingSummary, SeriesRecord};
use crate::models::user::UserRecord;
use super::errors::RepositoryError;

/// In-memory storage for users, used when no database pool is available
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStorage {
    users: Arc<Mutex<HashMap<String, UserRecord>>>,
}

impl InMemoryUserStorage {
    /// Create a new in-memory user storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a user, enforcing the same uniqueness rules as the users table
    pub fn insert(&self, user: &UserRecord) -> Result<UserRecord, RepositoryError> {
        let mut store = self.users.lock()?;

        if store.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("UNIQUE constraint failed: users.email".to_string()));
        }
        if store.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict("UNIQUE constraint failed: users.username".to_string()));
        }

        store.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    /// Find a user by email
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let store = self.users.lock()?;
        Ok(store.values().find(|u| u.email == email).cloned())
    }

    /// Find a user by username
    pub fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let store = self.users.lock()?;
        Ok(store.values().find(|u| u.username == username).cloned())
    }

    /// Find a user by ID
    pub fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let store = self.users.lock()?;
        Ok(store.get(id).cloned())
    }
}

/// In-memory storage for one time series, used when no database pool is available
#[derive(Debug, Clone)]
pub struct InMemorySeriesStorage<T> {
    readings: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for InMemorySeriesStorage<T> {
    fn default() -> Self {
        Self {
            readings: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: SeriesRecord> InMemorySeriesStorage<T> {
    /// Create a new empty series
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading
    pub fn insert(&self, reading: &T) -> Result<T, RepositoryError> {
        let mut store = self.readings.lock()?;
        store.push(reading.clone());
        Ok(reading.clone())
    }

    /// Get filtered readings
    pub fn get_filtered(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<T>, usize), RepositoryError> {
        let store = self.readings.lock()?;
        Ok(series::select_page(&store, start_date, end_date, limit, offset, sort_desc))
    }

    /// Aggregate the readings at or after `start_date`
    pub fn get_summary(&self, start_date: Option<&str>) -> Result<Option<ReadingSummary>, RepositoryError> {
        let store = self.readings.lock()?;
        Ok(series::summarize(&store, start_date))
    }
}
