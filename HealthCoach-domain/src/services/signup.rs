use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

use crate::auth::logging::{log_failed_login, log_registration, log_successful_login};
use crate::auth::{password, token, TokenConfig};
use crate::entities::conversions;
use crate::entities::user::{AuthSession, LoginRequest, SignupRequest, User};
use health_coach_data::models::user::NewUser;
use health_coach_data::repository::{RepositoryError, UserRepositoryTrait};

/// Message returned when the email is registered already
pub const EMAIL_TAKEN: &str = "Email already in use";

/// Message returned when the username is registered already
pub const USERNAME_TAKEN: &str = "Username already taken";

/// Message returned when the two password fields differ
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

/// Signup and login service errors
#[derive(Debug, Error)]
pub enum SignupServiceError {
    /// Request rejected before touching storage
    #[error("{0}")]
    ValidationError(String),

    /// Email or username already registered
    #[error("{0}")]
    Conflict(String),

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No such user
    #[error("User not found: {0}")]
    NotFound(String),

    /// Hashing or token signing failed
    #[error("Security error: {0}")]
    SecurityError(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Trait for account operations
#[async_trait]
pub trait SignupServiceTrait {
    /// Check the request fields before any lookups
    fn validate_signup_request(&self, request: &SignupRequest) -> Result<(), SignupServiceError>;

    /// Register a new user and issue a token
    async fn register(&self, request: SignupRequest) -> Result<AuthSession, SignupServiceError>;

    /// Verify credentials and issue a token
    async fn login(&self, request: LoginRequest) -> Result<AuthSession, SignupServiceError>;

    /// Look up a user by ID
    async fn get_user(&self, id: &str) -> Result<User, SignupServiceError>;
}

/// Account service backed by a user repository
pub struct SignupService<R: UserRepositoryTrait> {
    repository: R,
    token_config: TokenConfig,
}

impl<R: UserRepositoryTrait> SignupService<R> {
    /// Create a new signup service
    pub fn new(repository: R, token_config: TokenConfig) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> SignupServiceError {
        match err {
            // Lost a race with a concurrent signup between lookup and insert
            RepositoryError::Conflict(msg) if msg.contains("username") => {
                SignupServiceError::Conflict(USERNAME_TAKEN.to_string())
            }
            RepositoryError::Conflict(_) => SignupServiceError::Conflict(EMAIL_TAKEN.to_string()),
            RepositoryError::NotFound(msg) => SignupServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => SignupServiceError::ValidationError(msg),
            _ => SignupServiceError::RepositoryError(err.to_string()),
        }
    }

    fn issue_session(&self, user: User) -> Result<AuthSession, SignupServiceError> {
        let token = token::generate_token(&self.token_config, &user.id, &user.email)
            .map_err(|e| SignupServiceError::SecurityError(e.to_string()))?;
        Ok(AuthSession { token, user })
    }
}

#[async_trait]
impl<R: UserRepositoryTrait + Send + Sync> SignupServiceTrait for SignupService<R> {
    fn validate_signup_request(&self, request: &SignupRequest) -> Result<(), SignupServiceError> {
        if request.password != request.confirm_password {
            return Err(SignupServiceError::ValidationError(PASSWORD_MISMATCH.to_string()));
        }

        if let Err(validation_errors) = request.validate() {
            let mut fields: Vec<_> = validation_errors.field_errors().into_iter().collect();
            fields.sort_by_key(|(field, _)| *field);

            let error_message = fields
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |err| match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("Invalid {}", field),
                    })
                })
                .collect::<Vec<String>>()
                .join("; ");

            return Err(SignupServiceError::ValidationError(error_message));
        }

        Ok(())
    }

    async fn register(&self, request: SignupRequest) -> Result<AuthSession, SignupServiceError> {
        if let Err(e) = self.validate_signup_request(&request) {
            log_registration(&request.email, false, &e.to_string());
            return Err(e);
        }

        let email_taken = self
            .repository
            .find_by_email(&request.email)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .is_some();
        if email_taken {
            log_registration(&request.email, false, EMAIL_TAKEN);
            return Err(SignupServiceError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let username_taken = self
            .repository
            .find_by_username(&request.username)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .is_some();
        if username_taken {
            log_registration(&request.email, false, USERNAME_TAKEN);
            return Err(SignupServiceError::Conflict(USERNAME_TAKEN.to_string()));
        }

        let password_hash = password::hash_password(&request.password).map_err(|e| {
            error!("Password hashing failed: {}", e);
            SignupServiceError::SecurityError(e.to_string())
        })?;

        let record = self
            .repository
            .create(NewUser {
                email: request.email.clone(),
                username: request.username.clone(),
                password_hash,
            })
            .await
            .map_err(|e| {
                let mapped = self.map_repo_error(e);
                log_registration(&request.email, false, &mapped.to_string());
                mapped
            })?;

        let user = conversions::convert_to_domain_user(record);
        let session = self.issue_session(user)?;

        log_registration(&session.user.id, true, "Account created");
        info!("Registered user {} ({})", session.user.username, session.user.id);

        Ok(session)
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthSession, SignupServiceError> {
        let record = match self
            .repository
            .find_by_email(&request.email)
            .await
            .map_err(|e| self.map_repo_error(e))?
        {
            Some(record) => record,
            None => {
                log_failed_login(&request.email, "Unknown email");
                return Err(SignupServiceError::InvalidCredentials);
            }
        };

        let matches = password::verify_password(&request.password, &record.password_hash).map_err(|e| {
            error!("Stored password hash for user {} is unreadable: {}", record.id, e);
            SignupServiceError::SecurityError(e.to_string())
        })?;

        if !matches {
            log_failed_login(&request.email, "Wrong password");
            return Err(SignupServiceError::InvalidCredentials);
        }

        let session = self.issue_session(conversions::convert_to_domain_user(record))?;
        log_successful_login(&session.user.id);

        Ok(session)
    }

    async fn get_user(&self, id: &str) -> Result<User, SignupServiceError> {
        conversions::parse_string_to_uuid(id).map_err(SignupServiceError::ValidationError)?;

        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .map(conversions::convert_to_domain_user)
            .ok_or_else(|| SignupServiceError::NotFound(format!("User with ID {} not found", id)))
    }
}

/// Create a signup service using the repository from the data layer
pub fn create_default_signup_service(token_config: TokenConfig) -> impl SignupServiceTrait + Send + Sync {
    let repository = health_coach_data::repository::UserRepository::new();
    SignupService::new(repository, token_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_coach_data::models::user::UserRecord;
    use health_coach_data::repository::mock::MockUserRepository;
    use mockall::mock;

    mock! {
        pub Users {}

        #[async_trait]
        impl UserRepositoryTrait for Users {
            async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;
            async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepositoryError>;
            async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError>;
        }
    }

    fn token_config() -> TokenConfig {
        TokenConfig::new("signup-test-secret")
    }

    fn signup(email: &str, username: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "s3cure-password".to_string(),
            confirm_password: "s3cure-password".to_string(),
        }
    }

    fn service() -> SignupService<MockUserRepository> {
        SignupService::new(MockUserRepository::new(), token_config())
    }

    #[test]
    fn test_password_mismatch_is_checked_first() {
        let mut request = signup("not-an-email", "x");
        request.confirm_password = "different".to_string();

        let err = service().validate_signup_request(&request).unwrap_err();
        assert_eq!(err.to_string(), PASSWORD_MISMATCH);
    }

    #[test]
    fn test_field_validation_messages() {
        let err = service().validate_signup_request(&signup("not-an-email", "x")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid email address"));
        assert!(message.contains("Username must be between 3 and 50 characters"));
    }

    #[tokio::test]
    async fn test_register_issues_token_for_new_user() {
        let service = service();
        let session = service.register(signup("jane@example.com", "jane")).await.unwrap();

        assert_eq!(session.user.email, "jane@example.com");
        assert_eq!(session.user.username, "jane");

        let claims = token::validate_token(&token_config(), &session.token).unwrap();
        assert_eq!(claims.sub, session.user.id);
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let service = service();
        service.register(signup("jane@example.com", "jane")).await.unwrap();

        let email = service.register(signup("jane@example.com", "other")).await.unwrap_err();
        assert_eq!(email.to_string(), EMAIL_TAKEN);

        let username = service.register(signup("other@example.com", "jane")).await.unwrap_err();
        assert_eq!(username.to_string(), USERNAME_TAKEN);
    }

    #[tokio::test]
    async fn test_insert_conflict_maps_to_duplicate_message() {
        let mut repo = MockUsers::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_create().times(1).returning(|_| {
            Err(RepositoryError::Conflict("UNIQUE constraint failed: users.username".to_string()))
        });

        let service = SignupService::new(repo, token_config());
        let err = service.register(signup("race@example.com", "racer")).await.unwrap_err();
        assert!(matches!(err, SignupServiceError::Conflict(ref msg) if msg == USERNAME_TAKEN));
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let mut repo = MockUsers::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_create()
            .withf(|user| user.password_hash.starts_with("$argon2id$") && !user.password_hash.contains("s3cure"))
            .times(1)
            .returning(|user| {
                Ok(UserRecord {
                    id: "8d0f6f4e-4c39-4c0e-9a4f-3f7c2f1d9b11".to_string(),
                    email: user.email,
                    username: user.username,
                    password_hash: user.password_hash,
                    created_at: "2024-01-01T00:00:00.000Z".to_string(),
                })
            });

        let service = SignupService::new(repo, token_config());
        let session = service.register(signup("hash@example.com", "hasher")).await.unwrap();
        assert_eq!(session.user.id, "8d0f6f4e-4c39-4c0e-9a4f-3f7c2f1d9b11");
    }

    #[tokio::test]
    async fn test_storage_failure_is_a_repository_error() {
        let mut repo = MockUsers::new();
        repo.expect_find_by_email()
            .returning(|_| Err(RepositoryError::Task("connection refused".to_string())));

        let service = SignupService::new(repo, token_config());
        let err = service.register(signup("down@example.com", "down")).await.unwrap_err();
        assert!(matches!(err, SignupServiceError::RepositoryError(_)));
    }

    #[tokio::test]
    async fn test_login() {
        let service = service();
        let registered = service.register(signup("jane@example.com", "jane")).await.unwrap();

        let session = service
            .login(LoginRequest {
                email: "jane@example.com".to_string(),
                password: "s3cure-password".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.user, registered.user);

        let wrong_password = service
            .login(LoginRequest {
                email: "jane@example.com".to_string(),
                password: "guess".to_string(),
            })
            .await;
        assert!(matches!(wrong_password, Err(SignupServiceError::InvalidCredentials)));

        let unknown = service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "s3cure-password".to_string(),
            })
            .await;
        assert!(matches!(unknown, Err(SignupServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_get_user() {
        let service = service();
        let session = service.register(signup("jane@example.com", "jane")).await.unwrap();

        assert_eq!(service.get_user(&session.user.id).await.unwrap(), session.user);
        assert!(matches!(
            service.get_user("8d0f6f4e-4c39-4c0e-9a4f-3f7c2f1d9b11").await,
            Err(SignupServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.get_user("not-a-uuid").await,
            Err(SignupServiceError::ValidationError(_))
        ));
    }
}
