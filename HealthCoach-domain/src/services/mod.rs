pub mod blood_oxygen;
pub mod heart_rate;
pub mod signup;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use blood_oxygen::{create_default_blood_oxygen_service, BloodOxygenServiceError, BloodOxygenServiceTrait};
pub use heart_rate::{create_default_heart_rate_service, HeartRateServiceError, HeartRateServiceTrait};
pub use signup::{create_default_signup_service, SignupServiceError, SignupServiceTrait};
