use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Extension, Json,
};
use tracing::{error, info, instrument, warn};

use health_coach_domain::auth::Claims;
use health_coach_domain::entities::user::LoginRequest;
use health_coach_domain::services::SignupServiceError;

use super::signup::SignupService;
use crate::entities::auth::{AuthResponse, UserProfile};
use crate::entities::ErrorResponse;

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(service, payload))]
pub async fn login(
    State(service): State<SignupService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected login body: {}", rejection.body_text());
        ErrorResponse::bad_request("Request body must be a JSON object")
    })?;

    match service.login(request).await {
        Ok(session) => Ok(Json(AuthResponse::from_session("Login successful", session))),
        Err(SignupServiceError::InvalidCredentials) => {
            Err(ErrorResponse::unauthorized(SignupServiceError::InvalidCredentials.to_string()))
        }
        Err(e) => {
            error!("Login failed: {}", e);
            Err(ErrorResponse::internal_error("Server error during login"))
        }
    }
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "auth"
)]
#[instrument(skip(service, claims), fields(user_id = %claims.sub))]
pub async fn me(
    State(service): State<SignupService>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ErrorResponse> {
    match service.get_user(&claims.sub).await {
        Ok(user) => {
            info!("Profile fetched");
            Ok(Json(UserProfile::from(user)))
        }
        Err(SignupServiceError::NotFound(_)) | Err(SignupServiceError::ValidationError(_)) => {
            Err(ErrorResponse::not_found("User not found"))
        }
        Err(e) => {
            error!("Profile lookup failed: {}", e);
            Err(ErrorResponse::internal_error("An unexpected error occurred"))
        }
    }
}
