// HealthCoach Domain
// This crate contains the business logic for the HealthCoach signup service, vital sign history and heart rate relay

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Latest heart rate cache and live fan-out
pub mod relay;

// Health checks and system status
pub mod health;

// Re-export the database module from the data crate for convenience
pub use health_coach_data::database;

// Testing utilities - only available with mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
