// Domain entities and value objects
pub mod blood_oxygen;
pub mod conversions;
pub mod heart_rate;
pub mod series;
pub mod user;

// Re-export common types for easier imports
pub use blood_oxygen::{BloodOxygenReading, RecordBloodOxygenRequest, MAX_BLOOD_OXYGEN, MIN_BLOOD_OXYGEN};
pub use heart_rate::{
    HeartRateReading, HeartRateValue, LatestHeartRate, RecordHeartRateRequest, ValidatedSample, MAX_HEART_RATE,
    MIN_HEART_RATE,
};
pub use series::{ReadingStats, SampleTimestamp, TimeRange};
pub use user::{AuthSession, LoginRequest, SignupRequest, User};
