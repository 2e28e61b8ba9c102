use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{error, info, instrument, warn};

use health_coach_domain::entities::user::SignupRequest;
use health_coach_domain::services::{SignupServiceError, SignupServiceTrait};

use crate::entities::auth::AuthResponse;
use crate::entities::ErrorResponse;

/// Service type for dependency injection
pub type SignupService = Arc<dyn SignupServiceTrait + Send + Sync>;

/// Message returned for a new account
pub const SIGNUP_SUCCESS: &str = "User created successfully";

/// Message returned when signup fails unexpectedly
pub const SIGNUP_FAILURE: &str = "Server error during signup";

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Passwords differ, invalid fields, or email/username taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(service, payload))]
pub async fn signup(
    State(service): State<SignupService>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected signup body: {}", rejection.body_text());
        ErrorResponse::bad_request("Request body must be a JSON object")
    })?;

    info!("Signup requested for {}", request.email);

    match service.register(request).await {
        Ok(session) => Ok((StatusCode::CREATED, Json(AuthResponse::from_session(SIGNUP_SUCCESS, session)))),
        Err(SignupServiceError::ValidationError(message)) => Err(ErrorResponse::validation_error(message)),
        Err(SignupServiceError::Conflict(message)) => Err(ErrorResponse::validation_error(message)),
        Err(e) => {
            error!("Signup failed: {}", e);
            Err(ErrorResponse::internal_error(SIGNUP_FAILURE))
        }
    }
}
