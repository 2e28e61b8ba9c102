use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_coach_domain::entities::user::{AuthSession, User};

/// Public view of an account, as returned after signup or login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub email: String,
    pub username: String,
}

/// Response for a successful signup or login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Outcome message
    #[schema(example = "User created successfully")]
    pub message: String,

    /// Signed bearer token
    pub token: String,

    /// The account the token belongs to
    pub user: PublicUser,
}

impl AuthResponse {
    pub fn from_session(message: &str, session: AuthSession) -> Self {
        Self {
            message: message.to_string(),
            token: session.token,
            user: PublicUser {
                email: session.user.email,
                username: session.user.username,
            },
        }
    }
}

/// Profile of the authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub created_at: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            created_at: user.created_at,
        }
    }
}
