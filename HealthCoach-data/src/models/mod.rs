// Storage models
pub mod blood_oxygen;
pub mod heart_rate;
pub mod series;
pub mod user;
