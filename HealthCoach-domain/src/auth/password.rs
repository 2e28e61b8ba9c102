//! Password hashing and verification with Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::token::SecurityError;

/// Hash a password with a fresh random salt.
///
/// Returns a PHC string carrying the algorithm, parameters and salt.
pub fn hash_password(password: &str) -> Result<String, SecurityError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SecurityError::PasswordHash(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, SecurityError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| SecurityError::PasswordHash(format!("Invalid password hash format: {}", e)))?;

    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse-battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery", &hash).unwrap());
        assert!(!verify_password("wrong-horse-battery", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("password", "plain-text"),
            Err(SecurityError::PasswordHash(_))
        ));
    }
}
