use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::database::{get_db_pool, DatabasePool};
use crate::models::user::{NewUser, UserRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryUserStorage;
use super::storage::DatabaseStorage;

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepositoryTrait {
    /// Insert a new user. Fails with `Conflict` when the email or username is taken.
    async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError>;
}

/// Repository for users.
/// Uses the SQLite pool when one is available, in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct UserRepository {
    pool: Option<DatabasePool>,
    storage: InMemoryUserStorage,
}

impl UserRepository {
    /// Create a repository bound to the global pool, if it has been initialized
    pub fn new() -> Self {
        let pool = match get_db_pool() {
            Ok(pool) => Some(pool),
            Err(e) => {
                debug!("Database not available ({}), users will be kept in memory", e);
                None
            }
        };

        Self {
            pool,
            storage: InMemoryUserStorage::new(),
        }
    }

    /// Create a repository bound to a specific pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            pool: Some(pool),
            storage: InMemoryUserStorage::new(),
        }
    }

    /// Create a repository that only uses in-memory storage
    pub fn in_memory() -> Self {
        Self::default()
    }

    async fn find_in_database<F>(pool: &DatabasePool, key: &str, lookup: F) -> Result<Option<UserRecord>, RepositoryError>
    where
        F: Fn(&DatabasePool, &str) -> Result<Option<UserRecord>, RepositoryError> + Send + 'static,
    {
        let pool = pool.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || lookup(&pool, &key)).await?
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        match &self.pool {
            Some(pool) => {
                let pool = pool.clone();
                let to_store = record.clone();
                tokio::task::spawn_blocking(move || DatabaseStorage::insert_user(&pool, &to_store)).await??;
                Ok(record)
            }
            None => self.storage.insert(&record),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => Self::find_in_database(pool, email, DatabaseStorage::find_user_by_email).await,
            None => self.storage.find_by_email(email),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => Self::find_in_database(pool, username, DatabaseStorage::find_user_by_username).await,
            None => self.storage.find_by_username(username),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => Self::find_in_database(pool, id, DatabaseStorage::find_user_by_id).await,
            None => self.storage.find_by_id(id),
        }
    }
}

/// Mock user repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of UserRepository with optional failure injection
    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<Vec<UserRecord>>,
        fail_all: bool,
    }

    impl MockUserRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined users
        pub fn with_users(users: Vec<UserRecord>) -> Self {
            Self {
                users: Mutex::new(users),
                fail_all: false,
            }
        }

        /// Make every call fail with a storage error
        pub fn failing() -> Self {
            Self {
                users: Mutex::new(Vec::new()),
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
    impl UserRepositoryTrait for MockUserRepository {
        async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
            self.check()?;
            let mut users = self.users.lock()?;
            if users.iter().any(|u| u.email == user.email || u.username == user.username) {
                return Err(RepositoryError::Conflict("UNIQUE constraint failed".to_string()));
            }

            let record = UserRecord {
                id: Uuid::new_v4().to_string(),
                email: user.email,
                username: user.username,
                password_hash: user.password_hash,
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            };
            users.push(record.clone());
            Ok(record)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
            self.check()?;
            Ok(self.users.lock()?.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepositoryError> {
            self.check()?;
            Ok(self.users.lock()?.iter().find(|u| u.username == username).cloned())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
            self.check()?;
            Ok(self.users.lock()?.iter().find(|u| u.id == id).cloned())
        }
    }
}
