//! Database connection module for the HealthCoach application
//!
//! SQLite is the only backend. A file database is used by default; when the
//! file cannot be created or opened the pool falls back to an in-memory
//! database so the service can still run.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;

/// Connection pool shared by every repository
pub type DatabasePool = r2d2::Pool<SqliteConnectionManager>;

/// Global database pool used throughout the application
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Default location of the SQLite file when nothing is configured
pub const DEFAULT_SQLITE_PATH: &str = "data/health_coach.db";

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database stored in a file
    Sqlite,
    /// SQLite database held in memory, lost on restart
    Memory,
}

impl DatabaseType {
    /// Convert from string to database type
    pub fn from_str(s: &str) -> Result<Self, DatabaseError> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            "memory" | "in-memory" => Ok(DatabaseType::Memory),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Database pool already initialized
    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    /// Database pool not initialized
    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Config(String),
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type (sqlite, memory)
    pub db_type: DatabaseType,
    /// Path to SQLite database file
    pub sqlite_path: Option<String>,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some(DEFAULT_SQLITE_PATH.to_string()),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// In-memory configuration, mostly useful for tests
    pub fn in_memory() -> Self {
        Self {
            db_type: DatabaseType::Memory,
            sqlite_path: None,
            ..Self::default()
        }
    }

    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type_str = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        let db_type = DatabaseType::from_str(&db_type_str)?;

        let sqlite_path = env::var("DB_SQLITE_PATH").ok();

        match (db_type, &sqlite_path) {
            (DatabaseType::Sqlite, Some(path)) => info!("Using SQLite database at: {}", path),
            (DatabaseType::Sqlite, None) => {
                info!("No DB_SQLITE_PATH provided, will use default path: {}", DEFAULT_SQLITE_PATH)
            }
            (DatabaseType::Memory, _) => info!("Using in-memory SQLite database"),
        }

        let max_connections = parse_env("DB_MAX_CONNECTIONS", 10u32)?;
        let timeout_seconds = parse_env("DB_TIMEOUT_SECONDS", 30u64)?;

        if max_connections == 0 {
            return Err(DatabaseError::Config("DB_MAX_CONNECTIONS must be greater than zero".to_string()));
        }

        info!("Database configuration: max_connections={}, timeout={}s", max_connections, timeout_seconds);

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, DatabaseError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| DatabaseError::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

/// Initialize the global database connection pool from the environment
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let config = DatabaseConfig::from_env()?;
    info!("Initializing database pool with type: {:?}", config.db_type);

    let pool = create_pool(&config)?;

    DB_POOL.set(pool).map_err(|_| DatabaseError::PoolAlreadyInitialized)
}

/// Get the global database connection pool
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get().cloned().ok_or(DatabaseError::PoolNotInitialized)
}

/// Build a pool for the given configuration and run migrations on it
pub fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let pool = match config.db_type {
        DatabaseType::Sqlite => initialize_sqlite_pool(config)?,
        DatabaseType::Memory => initialize_in_memory_sqlite_pool(config)?,
    };

    let conn = pool.get()?;
    run_sqlite_migrations(&conn)?;

    Ok(pool)
}

/// Initialize SQLite connection pool
fn initialize_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let sqlite_path = config
        .sqlite_path
        .clone()
        .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string());

    info!("Initializing SQLite database at: {}", sqlite_path);

    if let Some(parent) = Path::new(&sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create directory: {}, falling back to in-memory database", e);
                return initialize_in_memory_sqlite_pool(config);
            }
        }
    }

    let manager = SqliteConnectionManager::file(&sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    match r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
    {
        Ok(pool) => {
            info!("SQLite connection pool created successfully");
            Ok(pool)
        }
        Err(e) => {
            error!("Failed to create SQLite connection pool: {}", e);
            warn!("Falling back to in-memory SQLite database");
            initialize_in_memory_sqlite_pool(config)
        }
    }
}

/// Initialize an in-memory SQLite database
///
/// Every SQLite in-memory connection is its own database, so the pool is
/// capped at a single connection.
fn initialize_in_memory_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let manager = SqliteConnectionManager::memory();

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    info!("In-memory SQLite database initialized successfully");
    Ok(pool)
}

/// Run a trivial query to confirm the pool can serve connections
pub fn ping_database(pool: &DatabasePool) -> Result<(), DatabaseError> {
    let conn = pool.get()?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

/// Get information about the current database connection
pub fn get_connection_info() -> Option<String> {
    let pool = DB_POOL.get()?;

    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to get SQLite connection: {}", e);
            return Some(format!("SQLite connection error: {}", e));
        }
    };

    let location = match conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2)) {
        Ok(path) if path.is_empty() || path == ":memory:" => "SQLite in-memory database".to_string(),
        Ok(path) => format!("SQLite database at {}", path),
        Err(_) => "SQLite database (path unknown)".to_string(),
    };

    let state = pool.state();
    Some(format!(
        "{} (connections: active={}, idle={})",
        location, state.connections, state.idle_connections
    ))
}
