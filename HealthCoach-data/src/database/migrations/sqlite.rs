use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    create_users_table(conn)?;
    create_heart_rate_table(conn)?;
    create_heart_rate_index(conn)?;
    create_blood_oxygen_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the users table
fn create_users_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating users table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| DatabaseError::Migration(format!("Failed to create users table: {}", e)))?;

    Ok(())
}

/// Create the heart rate readings table
fn create_heart_rate_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating heart_rate_readings table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS heart_rate_readings (
            id TEXT PRIMARY KEY,
            value REAL NOT NULL,
            sample_count INTEGER NOT NULL DEFAULT 1,
            recorded_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| DatabaseError::Migration(format!("Failed to create heart_rate_readings table: {}", e)))?;

    Ok(())
}

/// Create index on recorded_at for range queries
fn create_heart_rate_index(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating index on recorded_at");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_heart_rate_readings_recorded_at
        ON heart_rate_readings (recorded_at)",
        [],
    )
    .map_err(|e| DatabaseError::Migration(format!("Failed to create index: {}", e)))?;

    Ok(())
}

/// Create the blood oxygen readings table and its range index
fn create_blood_oxygen_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating blood_oxygen_readings table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS blood_oxygen_readings (
            id TEXT PRIMARY KEY,
            value REAL NOT NULL,
            recorded_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_blood_oxygen_readings_recorded_at
        ON blood_oxygen_readings (recorded_at);",
    )
    .map_err(|e| DatabaseError::Migration(format!("Failed to create blood_oxygen_readings table: {}", e)))?;

    Ok(())
}
