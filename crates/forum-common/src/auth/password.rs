//! Password hashing and strength policy
//!
//! Uses Argon2id for password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher as _, SaltString},
    Argon2,
};
use forum_core::{BoxError, PasswordHasher};
use serde::Deserialize;

use crate::error::AppError;

/// Hash a password using Argon2id
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// Argon2id implementation of the registration pipeline's hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, BoxError> {
        hash_password(password).map_err(Into::into)
    }
}

/// Password strength requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum length in characters
    pub min_length: usize,
    /// Require at least one uppercase and one lowercase letter
    pub require_mixed_case: bool,
    /// Require at least one ASCII digit
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_mixed_case: true,
            require_digit: true,
        }
    }
}

impl PasswordPolicy {
    /// Check a password against the policy
    ///
    /// # Errors
    /// Returns a human readable reason for the first unmet requirement
    pub fn check(&self, password: &str) -> Result<(), String> {
        if password.chars().count() < self.min_length {
            return Err(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        }

        if self.require_mixed_case {
            if !password.chars().any(char::is_uppercase) {
                return Err("Password must contain at least one uppercase letter".to_string());
            }
            if !password.chars().any(char::is_lowercase) {
                return Err("Password must contain at least one lowercase letter".to_string());
            }
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err("Password must contain at least one digit".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    use super::*;

    fn verifies(password: &str, hash: &str) -> bool {
        let parsed = PasswordHash::new(hash).unwrap();
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    #[test]
    fn test_hash_password() {
        let password = "SecurePassword123!";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id"));
        // Fresh salt every time
        let hash2 = hash_password(password).unwrap();
        assert_ne!(hash, hash2);
    }

    #[test]
    fn test_hash_verifies_only_original_password() {
        let hash = hash_password("SecurePassword123!").unwrap();

        assert!(verifies("SecurePassword123!", &hash));
        assert!(!verifies("WrongPassword123!", &hash));
    }

    #[test]
    fn test_hasher_trait_output_verifies() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("Tr0ub4dor&3").unwrap();

        assert!(!hash.contains("Tr0ub4dor&3"));
        assert!(verifies("Tr0ub4dor&3", &hash));
    }

    #[test]
    fn test_default_policy() {
        let policy = PasswordPolicy::default();

        assert!(policy.check("Password1").is_ok());
        assert!(policy.check("Pass1").is_err());
        assert!(policy.check("password1").is_err());
        assert!(policy.check("PASSWORD1").is_err());
        assert!(policy.check("Passwordx").is_err());
    }

    #[test]
    fn test_policy_messages() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.check("Ab1").unwrap_err(),
            "Password must be at least 8 characters long"
        );
        assert_eq!(
            policy.check("abcdefg1").unwrap_err(),
            "Password must contain at least one uppercase letter"
        );
    }

    #[test]
    fn test_relaxed_policy() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_mixed_case: false,
            require_digit: false,
        };
        assert!(policy.check("abcd").is_ok());
        assert!(policy.check("abc").is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_mixed_case: false,
            require_digit: false,
        };
        // Four characters, eight bytes
        assert!(policy.check("åäöü").is_ok());
    }
}
