// Public entities for the HealthCoach API
// These are the shapes that cross the HTTP boundary

// Errors, pagination and shared query parameters
pub mod common;

// Signup, login and profile payloads
pub mod auth;

// Vital sign payloads
pub mod blood_oxygen;
pub mod heart_rate;

pub use common::{
    BloodOxygenHistoryResponse, ErrorResponse, HeartRateHistoryResponse, HistoryQueryParams, PaginatedResponse,
    ReadingStatsResponse, StatsQueryParams,
};
