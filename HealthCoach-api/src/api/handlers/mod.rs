pub mod auth;
pub mod blood_oxygen;
pub mod health;
pub mod heart_rate;
pub mod heart_rate_ws;
pub mod query;
pub mod signup;

// Tests module
#[cfg(test)]
mod tests;

// Re-export handlers for easier imports
pub use auth::{login, me};
pub use blood_oxygen::{get_blood_oxygen_history, get_blood_oxygen_stats, record_blood_oxygen};
pub use health::health_check;
pub use heart_rate::{get_heart_rate_history, get_heart_rate_stats, get_latest_heart_rate, record_heart_rate};
pub use heart_rate_ws::heart_rate_ws;
pub use signup::signup;
