use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use health_coach_domain::auth::{auth_middleware, configure_auth, TokenConfig};
use health_coach_domain::health::HealthService as DomainHealthService;
use health_coach_domain::relay::{HeartRateRelay, SharedRelay};
use health_coach_domain::services::{
    create_default_blood_oxygen_service, create_default_heart_rate_service, create_default_signup_service,
};

use crate::api::handlers::{
    self, blood_oxygen::BloodOxygenService, health::HealthService, heart_rate::HeartRateService,
    signup::SignupService,
};
use crate::config::ServerConfig;
use crate::openapi::configure_swagger_routes;

/// Shared state handed to every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub signup_service: SignupService,
    pub heart_rate_service: HeartRateService,
    pub blood_oxygen_service: BloodOxygenService,
    pub health_service: HealthService,
    pub relay: SharedRelay,
    pub token_config: TokenConfig,
    pub environment: Arc<str>,
}

impl AppState {
    /// Build the production state over the data layer repositories
    pub fn from_config(config: &ServerConfig) -> Self {
        let relay = HeartRateRelay::shared(config.relay_capacity);

        Self {
            signup_service: Arc::new(create_default_signup_service(config.token.clone())),
            heart_rate_service: Arc::new(create_default_heart_rate_service(relay.clone())),
            blood_oxygen_service: Arc::new(create_default_blood_oxygen_service()),
            health_service: Arc::new(DomainHealthService::new(relay.clone())),
            relay,
            token_config: config.token.clone(),
            environment: Arc::from(config.environment.as_str()),
        }
    }
}

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    // Routes that require a bearer token
    let protected_routes = Router::new()
        .route("/me", get(handlers::me))
        .layer(middleware::from_fn_with_state(state.token_config.clone(), auth_middleware));

    let api_routes = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        // Specific paths before the bare collection route
        .route("/heartrate/history", get(handlers::get_heart_rate_history))
        .route("/heartrate/stats", get(handlers::get_heart_rate_stats))
        .route(
            "/heartrate",
            get(handlers::get_latest_heart_rate).post(handlers::record_heart_rate),
        )
        .route("/bloodoxygen/history", get(handlers::get_blood_oxygen_history))
        .route("/bloodoxygen/stats", get(handlers::get_blood_oxygen_stats))
        .route("/bloodoxygen", post(handlers::record_blood_oxygen))
        .merge(protected_routes);

    debug!("API routes configured");

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ws", get(handlers::heart_rate_ws))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(configure_swagger_routes())
        .layer(TraceLayer::new_for_http());

    debug!("Routes merged, applying security configuration");

    configure_auth(app)
}
