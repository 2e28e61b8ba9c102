use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Kinds of account and authentication events worth auditing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Account registration
    Registration,
    /// Successful login
    Login,
    /// Rejected login
    FailedLogin,
    /// Bearer token check on a protected route
    TokenValidation,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AuthEventType::Registration => "REGISTRATION",
            AuthEventType::Login => "LOGIN",
            AuthEventType::FailedLogin => "FAILED_LOGIN",
            AuthEventType::TokenValidation => "TOKEN_VALIDATION",
        };
        f.write_str(label)
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    /// Type of event
    pub event_type: AuthEventType,
    /// User ID or submitted identifier, when known
    pub subject: Option<String>,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// Whether the operation succeeded
    pub success: bool,
    /// Free-form details
    pub details: Option<String>,
    /// Request path, for events raised by middleware
    pub resource: Option<String>,
    /// Time spent on the operation in milliseconds
    pub duration_ms: Option<u64>,
    /// Credential type (password, jwt)
    pub auth_method: Option<String>,
}

impl AuthEvent {
    /// Create a new event stamped with the current time
    pub fn new(event_type: AuthEventType, subject: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            subject: subject.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Emit an `AUTH-LOG` line. Failures are logged at warn level.
pub fn log_auth_event(event: AuthEvent) {
    let subject = event.subject.as_deref().unwrap_or("anonymous");
    let status = if event.success { "SUCCESS" } else { "FAILURE" };
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("-");
    let method = event.auth_method.as_deref().unwrap_or("-");
    let timestamp = event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

    if event.success {
        info!(
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] [{}] {}",
            event.event_type, subject, status, method, resource, timestamp, details
        );
    } else {
        warn!(
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] [{}] {}",
            event.event_type, subject, status, method, resource, timestamp, details
        );
    }
}

/// Log the outcome of a signup attempt
pub fn log_registration(subject: &str, success: bool, details: &str) {
    let event = AuthEvent::new(AuthEventType::Registration, Some(subject), success)
        .with_details(details)
        .with_auth_method("password");

    log_auth_event(event);
}

/// Log a successful login
pub fn log_successful_login(user_id: &str) {
    let event = AuthEvent::new(AuthEventType::Login, Some(user_id), true).with_auth_method("password");
    log_auth_event(event);
}

/// Log a rejected login
pub fn log_failed_login(email: &str, reason: &str) {
    let event = AuthEvent::new(AuthEventType::FailedLogin, Some(email), false)
        .with_details(reason)
        .with_auth_method("password");

    log_auth_event(event);
}
