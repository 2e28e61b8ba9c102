//! Authentication for the HealthCoach API
//!
//! Signed HS256 access tokens, Argon2 password hashing and the axum
//! middleware that guards routes requiring a logged-in user.

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub mod logging;
pub mod password;
pub mod token;

pub use token::{SecurityError, TokenConfig};

/// Claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Email of the user at the time the token was issued
    pub email: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

#[cfg(feature = "with-api")]
mod middleware {
    use std::time::Instant;

    use axum::{
        extract::{Request, State},
        http::{header, HeaderMap, StatusCode},
        middleware::Next,
        response::{IntoResponse, Response},
        Json,
    };
    use serde_json::json;
    use tracing::debug;

    use super::logging::{log_auth_event, AuthEvent, AuthEventType};
    use super::token::{self, SecurityError, TokenConfig};

    fn unauthorized(message: &str) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "message": message })),
        )
            .into_response()
    }

    /// Pull the token out of an `Authorization: Bearer <token>` header
    pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or("Missing Authorization header")?
            .to_str()
            .map_err(|_| "Invalid Authorization header format")?;

        value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or("Authorization header does not contain a Bearer token")
    }

    /// Authentication middleware for protected routes.
    ///
    /// On success the token's [`Claims`](super::Claims) are inserted into the
    /// request extensions. Any failure yields 401.
    pub async fn auth_middleware(State(config): State<TokenConfig>, mut req: Request, next: Next) -> Response {
        let started = Instant::now();
        let resource = req.uri().path().to_string();

        let token = match extract_bearer_token(req.headers()) {
            Ok(token) => token.to_string(),
            Err(reason) => {
                debug!("Rejecting request to {}: {}", resource, reason);
                log_auth_event(
                    AuthEvent::new(AuthEventType::TokenValidation, None, false)
                        .with_details(reason)
                        .with_resource(resource)
                        .with_duration(started.elapsed().as_millis() as u64)
                        .with_auth_method("jwt"),
                );
                return unauthorized(reason);
            }
        };

        match token::validate_token(&config, &token) {
            Ok(claims) => {
                log_auth_event(
                    AuthEvent::new(AuthEventType::TokenValidation, Some(&claims.sub), true)
                        .with_resource(resource)
                        .with_duration(started.elapsed().as_millis() as u64)
                        .with_auth_method("jwt"),
                );
                req.extensions_mut().insert(claims);
                next.run(req).await
            }
            Err(e) => {
                let message = match e {
                    SecurityError::TokenExpired => "Token has expired",
                    _ => "Invalid token",
                };
                log_auth_event(
                    AuthEvent::new(AuthEventType::TokenValidation, None, false)
                        .with_details(e.to_string())
                        .with_resource(resource)
                        .with_duration(started.elapsed().as_millis() as u64)
                        .with_auth_method("jwt"),
                );
                unauthorized(message)
            }
        }
    }

    /// Apply CORS and security headers to the whole application
    pub fn configure_auth(app: axum::Router) -> axum::Router {
        use axum::http::{HeaderName, HeaderValue, Method};
        use tower_http::cors::{Any, CorsLayer};
        use tower_http::set_header::SetResponseHeaderLayer;

        // Devices and the browser app post from other origins
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .max_age(std::time::Duration::from_secs(3600));

        let security_headers = tower::ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static("max-age=63072000; includeSubDomains"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ));

        app.layer(cors).layer(security_headers)
    }
}

#[cfg(feature = "with-api")]
pub use middleware::{auth_middleware, configure_auth, extract_bearer_token};

#[cfg(all(test, feature = "with-api"))]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, HeaderMap, HeaderValue, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    fn config() -> TokenConfig {
        TokenConfig::new("middleware-test-secret")
    }

    fn app() -> Router {
        Router::new()
            .route("/private", get(|Extension(claims): Extension<Claims>| async move { claims.sub }))
            .layer(from_fn_with_state(config(), auth_middleware))
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def");
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let token = token::generate_token(&config(), "user-42", "u@example.com").unwrap();
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/private")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"user-42");
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_is_unauthorized() {
        let missing = app()
            .oneshot(Request::builder().uri("/private").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let forged = token::generate_token(&TokenConfig::new("other-secret"), "user-42", "u@example.com").unwrap();
        let rejected = app()
            .oneshot(
                Request::builder()
                    .uri("/private")
                    .header(header::AUTHORIZATION, format!("Bearer {}", forged))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    }
}
