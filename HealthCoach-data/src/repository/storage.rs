use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::blood_oxygen::BloodOxygenRecord;
use crate::models::heart_rate::HeartRateRecord;
use crate::models::series::ReadingSummary;
use crate::models::user::UserRecord;
use super::errors::RepositoryError;

/// Database storage operations. All functions block and are meant to be
/// called from `tokio::task::spawn_blocking`.
pub struct DatabaseStorage;

const USER_COLUMNS: &str = "id, email, username, password_hash, created_at";
const READING_COLUMNS: &str = "id, value, sample_count, recorded_at";
const BLOOD_OXYGEN_COLUMNS: &str = "id, value, recorded_at";

const HEART_RATE_TABLE: &str = "heart_rate_readings";
const BLOOD_OXYGEN_TABLE: &str = "blood_oxygen_readings";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn reading_from_row(row: &Row<'_>) -> rusqlite::Result<HeartRateRecord> {
    Ok(HeartRateRecord {
        id: row.get(0)?,
        value: row.get(1)?,
        sample_count: row.get::<_, i64>(2)?.max(0) as u32,
        recorded_at: row.get(3)?,
    })
}

fn blood_oxygen_from_row(row: &Row<'_>) -> rusqlite::Result<BloodOxygenRecord> {
    Ok(BloodOxygenRecord {
        id: row.get(0)?,
        value: row.get(1)?,
        recorded_at: row.get(2)?,
    })
}

impl DatabaseStorage {
    /// Insert a user row
    pub fn insert_user(pool: &DatabasePool, user: &UserRecord) -> Result<(), RepositoryError> {
        debug!("Storing user in database: id={}", user.id);

        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO users (id, email, username, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user.id, user.email, user.username, user.password_hash, user.created_at],
        )?;

        Ok(())
    }

    /// Look up a single user by one of its unique columns
    fn find_user_by(pool: &DatabasePool, column: &str, value: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let conn = pool.get()?;
        let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);

        let user = conn.query_row(&sql, params![value], user_from_row).optional()?;
        Ok(user)
    }

    /// Find a user by email
    pub fn find_user_by_email(pool: &DatabasePool, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Self::find_user_by(pool, "email", email)
    }

    /// Find a user by username
    pub fn find_user_by_username(pool: &DatabasePool, username: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Self::find_user_by(pool, "username", username)
    }

    /// Find a user by ID
    pub fn find_user_by_id(pool: &DatabasePool, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Self::find_user_by(pool, "id", id)
    }

    /// Insert a heart rate reading
    pub fn insert_reading(pool: &DatabasePool, reading: &HeartRateRecord) -> Result<(), RepositoryError> {
        debug!("Storing heart rate reading in database: id={}", reading.id);

        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO heart_rate_readings (id, value, sample_count, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![reading.id, reading.value, reading.sample_count, reading.recorded_at],
        )?;

        Ok(())
    }

    /// Get filtered readings together with the total number of matches
    pub fn get_filtered_readings(
        pool: &DatabasePool,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HeartRateRecord>, usize), RepositoryError> {
        debug!("Getting filtered heart rate readings from database");
        Self::select_page(
            pool,
            HEART_RATE_TABLE,
            READING_COLUMNS,
            reading_from_row,
            Window { start_date, end_date, limit, offset, sort_desc },
        )
    }

    /// Aggregate the heart rate readings at or after `start_date`
    pub fn get_reading_summary(
        pool: &DatabasePool,
        start_date: Option<&str>,
    ) -> Result<Option<ReadingSummary>, RepositoryError> {
        Self::summarize(pool, HEART_RATE_TABLE, start_date)
    }

    /// Insert a blood oxygen reading
    pub fn insert_blood_oxygen(pool: &DatabasePool, reading: &BloodOxygenRecord) -> Result<(), RepositoryError> {
        debug!("Storing blood oxygen reading in database: id={}", reading.id);

        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO blood_oxygen_readings (id, value, recorded_at) VALUES (?1, ?2, ?3)",
            params![reading.id, reading.value, reading.recorded_at],
        )?;

        Ok(())
    }

    /// Get filtered blood oxygen readings together with the total number of matches
    pub fn get_filtered_blood_oxygen(
        pool: &DatabasePool,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<BloodOxygenRecord>, usize), RepositoryError> {
        debug!("Getting filtered blood oxygen readings from database");
        Self::select_page(
            pool,
            BLOOD_OXYGEN_TABLE,
            BLOOD_OXYGEN_COLUMNS,
            blood_oxygen_from_row,
            Window { start_date, end_date, limit, offset, sort_desc },
        )
    }

    /// Aggregate the blood oxygen readings at or after `start_date`
    pub fn get_blood_oxygen_summary(
        pool: &DatabasePool,
        start_date: Option<&str>,
    ) -> Result<Option<ReadingSummary>, RepositoryError> {
        Self::summarize(pool, BLOOD_OXYGEN_TABLE, start_date)
    }

    fn select_page<T>(
        pool: &DatabasePool,
        table: &str,
        columns: &str,
        from_row: fn(&Row<'_>) -> rusqlite::Result<T>,
        window: Window<'_>,
    ) -> Result<(Vec<T>, usize), RepositoryError> {
        let (limit, offset) = page_bounds(window.limit, window.offset)?;
        let conn = pool.get()?;

        // NULL bounds disable the corresponding filter
        let filter = "WHERE (?1 IS NULL OR recorded_at >= ?1) AND (?2 IS NULL OR recorded_at <= ?2)";

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} {}", table, filter),
            params![window.start_date, window.end_date],
            |row| row.get(0),
        )?;

        let direction = if window.sort_desc.unwrap_or(false) { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY recorded_at {}, rowid {} LIMIT ?3 OFFSET ?4",
            columns, table, filter, direction, direction
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![window.start_date, window.end_date, limit, offset], from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((rows, total.max(0) as usize))
    }

    fn summarize(
        pool: &DatabasePool,
        table: &str,
        start_date: Option<&str>,
    ) -> Result<Option<ReadingSummary>, RepositoryError> {
        debug!("Aggregating {} from database", table);

        let conn = pool.get()?;
        let filter = "WHERE (?1 IS NULL OR recorded_at >= ?1)";

        let (count, average, min, max): (i64, Option<f64>, Option<f64>, Option<f64>) = conn.query_row(
            &format!("SELECT COUNT(*), AVG(value), MIN(value), MAX(value) FROM {} {}", table, filter),
            params![start_date],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let latest: Option<f64> = conn
            .query_row(
                &format!(
                    "SELECT value FROM {} {} ORDER BY recorded_at DESC, rowid DESC LIMIT 1",
                    table, filter
                ),
                params![start_date],
                |row| row.get(0),
            )
            .optional()?;

        Ok(match (average, min, max, latest) {
            (Some(average), Some(min), Some(max), Some(latest)) if count > 0 => Some(ReadingSummary {
                count: count as usize,
                average,
                min,
                max,
                latest,
            }),
            _ => None,
        })
    }
}

/// Range and pagination arguments shared by the series queries
struct Window<'a> {
    start_date: Option<&'a str>,
    end_date: Option<&'a str>,
    limit: Option<usize>,
    offset: Option<usize>,
    sort_desc: Option<bool>,
}

/// Convert pagination arguments to SQLite integers.
/// A missing limit becomes -1, which SQLite treats as "no limit".
fn page_bounds(limit: Option<usize>, offset: Option<usize>) -> Result<(i64, i64), RepositoryError> {
    let to_i64 = |name: &str, value: usize| {
        i64::try_from(value)
            .map_err(|_| RepositoryError::Validation(format!("{} {} is out of range", name, value)))
    };

    let limit = match limit {
        Some(limit) => to_i64("limit", limit)?,
        None => -1,
    };
    let offset = to_i64("offset", offset.unwrap_or(0))?;

    Ok((limit, offset))
}
