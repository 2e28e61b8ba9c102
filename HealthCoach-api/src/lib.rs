// HealthCoach API
//
// HTTP routes, the live heart rate WebSocket and the OpenAPI document
// for the HealthCoach signup service and heart rate relay.

pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;

pub use api::{create_app, create_application, AppState};
pub use config::ServerConfig;
