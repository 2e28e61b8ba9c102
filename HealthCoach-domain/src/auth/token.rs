use std::env;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::auth::Claims;

/// Issuer written into tokens when `JWT_ISSUER` is not set
pub const DEFAULT_ISSUER: &str = "health-coach-api";

/// Token lifetime when `TOKEN_EXPIRATION_HOURS` is not set
pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// Longest accepted token lifetime (one year)
pub const MAX_EXPIRATION_HOURS: i64 = 24 * 365;

/// Secret used by debug builds when `JWT_SECRET` is missing
const DEVELOPMENT_SECRET: &str = "health-coach-development-secret-change-me";

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),

    /// Password hashing or hash parsing failed
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

/// Signing configuration for access tokens
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret
    pub secret: String,
    /// Value of the `iss` claim
    pub issuer: String,
    /// Token lifetime in hours
    pub expiration_hours: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

impl TokenConfig {
    /// Configuration with the default issuer and lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            expiration_hours: DEFAULT_EXPIRATION_HOURS,
        }
    }

    /// Load the configuration from `JWT_SECRET`, `JWT_ISSUER` and `TOKEN_EXPIRATION_HOURS`.
    ///
    /// Release builds refuse to start without a secret. Debug builds fall back to a
    /// fixed development secret and log a warning.
    pub fn from_env() -> Result<Self, SecurityError> {
        let secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if cfg!(debug_assertions) => {
                warn!("JWT_SECRET is not set, using the development secret. Do not use this in production.");
                DEVELOPMENT_SECRET.to_string()
            }
            _ => {
                error!("JWT_SECRET environment variable not found");
                return Err(SecurityError::ConfigError(
                    "JWT_SECRET environment variable not found".to_string(),
                ));
            }
        };

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string());

        let expiration_hours = match env::var("TOKEN_EXPIRATION_HOURS") {
            Ok(raw) => parse_expiration_hours(&raw)?,
            Err(_) => DEFAULT_EXPIRATION_HOURS,
        };

        info!("Token configuration loaded: issuer={}, expiration={}h", issuer, expiration_hours);

        Ok(Self {
            secret,
            issuer,
            expiration_hours,
        })
    }
}

/// Parse a token lifetime in hours, accepting 1 to [`MAX_EXPIRATION_HOURS`]
pub fn parse_expiration_hours(raw: &str) -> Result<i64, SecurityError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|hours| (1..=MAX_EXPIRATION_HOURS).contains(hours))
        .ok_or_else(|| {
            SecurityError::ConfigError(format!(
                "TOKEN_EXPIRATION_HOURS must be between 1 and {}, got {}",
                MAX_EXPIRATION_HOURS, raw
            ))
        })
}

/// Generate a signed HS256 token for a user
pub fn generate_token(config: &TokenConfig, user_id: &str, email: &str) -> Result<String, SecurityError> {
    let now = Utc::now();
    // Configs built in code skip parse_expiration_hours
    let expiration = now + Duration::hours(config.expiration_hours.clamp(1, MAX_EXPIRATION_HOURS));

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iss: config.issuer.clone(),
        iat: now.timestamp(),
        exp: expiration.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })?;

    // Never log the token itself
    info!("Generated access token for user {}", user_id);
    debug!("Token expiration: {}", expiration);

    Ok(token)
}

/// Validate a token's signature, expiry and issuer and return its claims
pub fn validate_token(config: &TokenConfig, token: &str) -> Result<Claims, SecurityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[config.issuer.as_str()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => SecurityError::InvalidIssuer,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            SecurityError::TokenValidation("Invalid signature".to_string())
        }
        _ => SecurityError::TokenValidation(e.to_string()),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TokenConfig {
        TokenConfig {
            secret: "test_secret_key_for_testing_only".to_string(),
            issuer: "test-issuer".to_string(),
            expiration_hours: 24,
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = config();
        let token = generate_token(&config, "user-123", "jane@example.com").unwrap();
        assert!(!token.is_empty());

        let claims = validate_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_expired_token() {
        let config = config();
        let claims = Claims {
            sub: "user-456".to_string(),
            email: "old@example.com".to_string(),
            iss: config.issuer.clone(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        match validate_token(&config, &token) {
            Err(SecurityError::TokenExpired) => {}
            other => panic!("Expected TokenExpired error but got: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_secret_and_issuer_are_rejected() {
        let config = config();
        let token = generate_token(&config, "user-789", "x@example.com").unwrap();

        let other_secret = TokenConfig {
            secret: "another-secret".to_string(),
            ..config.clone()
        };
        assert!(matches!(
            validate_token(&other_secret, &token),
            Err(SecurityError::TokenValidation(_))
        ));

        let other_issuer = TokenConfig {
            issuer: "someone-else".to_string(),
            ..config
        };
        assert!(matches!(validate_token(&other_issuer, &token), Err(SecurityError::InvalidIssuer)));
    }

    #[test]
    fn test_invalid_token() {
        match validate_token(&config(), "invalid.token.format") {
            Err(SecurityError::InvalidToken) | Err(SecurityError::TokenValidation(_)) => {}
            other => panic!("Expected InvalidToken or TokenValidation error, got {:?}", other),
        }
    }

    #[test]
    fn test_expiration_hours_are_bounded() {
        assert_eq!(parse_expiration_hours("48").unwrap(), 48);
        assert_eq!(parse_expiration_hours(" 8760 ").unwrap(), MAX_EXPIRATION_HOURS);

        for raw in ["0", "-3", "8761", "9223372036854775807", "soon"] {
            assert!(
                matches!(parse_expiration_hours(raw), Err(SecurityError::ConfigError(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_oversized_lifetime_in_code_is_clamped() {
        let config = TokenConfig {
            expiration_hours: i64::MAX,
            ..config()
        };

        let token = generate_token(&config, "user-1", "long@example.com").unwrap();
        let claims = validate_token(&config, &token).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_EXPIRATION_HOURS * 3600);
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let output = format!("{:?}", config());
        assert!(!output.contains("test_secret_key"));
        assert!(output.contains("test-issuer"));
    }
}
