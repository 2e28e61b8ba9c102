// Repository module structure
mod blood_oxygen;
pub mod errors;
mod heart_rate;
mod in_memory;
mod storage;
mod user;

// Re-export commonly used types
pub use blood_oxygen::{BloodOxygenRepository, BloodOxygenRepositoryTrait};
pub use errors::RepositoryError;
pub use heart_rate::{HeartRateRepository, HeartRateRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};

// Mock repositories for both testing and when the mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    pub use super::blood_oxygen::mock::MockBloodOxygenRepository;
    pub use super::heart_rate::mock::MockHeartRateRepository;
    pub use super::user::mock::MockUserRepository;
}
