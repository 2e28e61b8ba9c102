use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Account endpoints
        crate::api::handlers::signup::signup,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::me,

        // Heart rate endpoints
        crate::api::handlers::heart_rate::record_heart_rate,
        crate::api::handlers::heart_rate::get_latest_heart_rate,
        crate::api::handlers::heart_rate::get_heart_rate_history,
        crate::api::handlers::heart_rate::get_heart_rate_stats,

        // Blood oxygen endpoints
        crate::api::handlers::blood_oxygen::record_blood_oxygen,
        crate::api::handlers::blood_oxygen::get_blood_oxygen_history,
        crate::api::handlers::blood_oxygen::get_blood_oxygen_stats,
    ),
    components(
        schemas(
            // Common
            crate::entities::common::ErrorResponse,
            crate::entities::common::HeartRateHistoryResponse,
            crate::entities::common::BloodOxygenHistoryResponse,
            crate::entities::common::HistoryQueryParams,
            crate::entities::common::StatsQueryParams,
            crate::entities::common::ReadingStatsResponse,

            // Accounts
            crate::entities::auth::AuthResponse,
            crate::entities::auth::PublicUser,
            crate::entities::auth::UserProfile,
            health_coach_domain::entities::user::SignupRequest,
            health_coach_domain::entities::user::LoginRequest,

            // Heart rate
            crate::entities::heart_rate::RecordHeartRateBody,
            crate::entities::heart_rate::RecordHeartRateResponse,
            crate::entities::heart_rate::HeartRateReadingResponse,
            health_coach_domain::entities::heart_rate::LatestHeartRate,

            // Blood oxygen
            crate::entities::blood_oxygen::RecordBloodOxygenBody,
            crate::entities::blood_oxygen::RecordBloodOxygenResponse,
            crate::entities::blood_oxygen::BloodOxygenReadingResponse,

            // Health
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Signup, login and profile endpoints"),
        (name = "heart_rate", description = "Heart rate relay endpoints. Live updates are served on the /ws WebSocket"),
        (name = "blood_oxygen", description = "Blood oxygen (SpO2) history and statistics")
    ),
    info(
        title = "HealthCoach API",
        version = "0.1.0",
        description = "Account signup, vital sign history and live heart rate relay for the HealthCoach application",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
