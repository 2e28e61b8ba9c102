//! Domain layer health checks

use std::collections::HashMap;

use async_trait::async_trait;
use health_coach_data::database::{self, DatabasePool};

use crate::relay::SharedRelay;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component works with reduced guarantees
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// A health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Build a report whose overall status is the worst component status
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the database.
    /// `Ok(true)` when the pool answers, `Ok(false)` when running on in-memory
    /// storage, `Err` when the pool is configured but failing.
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Health service reporting on the database pool and the heart rate relay
#[derive(Debug, Clone)]
pub struct HealthService {
    pool: Option<DatabasePool>,
    relay: SharedRelay,
}

impl HealthService {
    /// Health service for the global pool, if one was initialized
    pub fn new(relay: SharedRelay) -> Self {
        Self {
            pool: database::get_db_pool().ok(),
            relay,
        }
    }

    /// Health service for a specific pool
    pub fn with_pool(pool: Option<DatabasePool>, relay: SharedRelay) -> Self {
        Self { pool, relay }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let database = match self.check_database_status().await {
            Ok(true) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: self.pool.as_ref().map(|pool| {
                    let state = pool.state();
                    format!("SQLite pool (connections: {}, idle: {})", state.connections, state.idle_connections)
                }),
            },
            Ok(false) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("No database configured, data is kept in memory".to_string()),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let relay = HealthComponent {
            status: ComponentStatus::Healthy,
            details: Some(format!("{} subscriber(s)", self.relay.subscriber_count())),
        };

        SystemHealth::from_components(
            vec![("database".to_string(), database), ("relay".to_string(), relay)]
                .into_iter()
                .collect(),
        )
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        let Some(pool) = self.pool.clone() else {
            return Ok(false);
        };

        tokio::task::spawn_blocking(move || database::ping_database(&pool))
            .await
            .map_err(|e| format!("Database check did not complete: {}", e))?
            .map(|_| true)
            .map_err(|e| format!("Database connection error: {}", e))
    }
}
