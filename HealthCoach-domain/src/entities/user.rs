use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Registration payload. Missing fields deserialize as empty strings and are
/// rejected by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct SignupRequest {
    /// Email address, must be unique
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Display name, must be unique
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,

    /// Plain-text password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Must equal `password`
    pub confirm_password: String,
}

/// Credentials for an existing account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct LoginRequest {
    /// Email address used at signup
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// A registered user, without credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub username: String,
    /// When the account was created
    pub created_at: String,
}

/// Result of a successful signup or login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Signed access token
    pub token: String,
    /// The authenticated user
    pub user: User,
}
