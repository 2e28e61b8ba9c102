use serde::{Deserialize, Serialize};

/// Storage model for a registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique identifier for the user
    pub id: String,

    /// Email address, unique across users
    pub email: String,

    /// Display name, unique across users
    pub username: String,

    /// Password hash in PHC string format
    pub password_hash: String,

    /// When the account was created (RFC 3339)
    pub created_at: String,
}

/// Input data for inserting a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Email address
    pub email: String,

    /// Display name
    pub username: String,

    /// Password hash in PHC string format
    pub password_hash: String,
}
