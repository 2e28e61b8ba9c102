pub mod handlers;
pub mod routes;

pub use routes::{create_app, AppState};

use axum::Router;

use crate::config::ServerConfig;

/// Create the application router with production services
pub fn create_application(config: &ServerConfig) -> Router {
    handlers::health::initialize_server_start_time();
    create_app(AppState::from_config(config))
}
