use bcrypt::{hash, verify, DEFAULT_COST};

use super::{AuthError, MAX_PASSWORD_BYTES};

/// Salted one-way password hashing backed by bcrypt.
///
/// `verify` compares digests in constant time.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    /// Uses the given bcrypt cost factor (4..=31).
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes `password` with a fresh salt.
    ///
    /// Input longer than `MAX_PASSWORD_BYTES` is refused rather than
    /// truncated.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::Hashing(format!(
                "Failed to hash password: longer than {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        hash(password, self.cost)
            .map_err(|e| AuthError::Hashing(format!("Failed to hash password: {}", e)))
    }

    /// Checks `password` against a stored bcrypt hash.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AuthError> {
        verify(password, hashed_password)
            .map_err(|e| AuthError::Hashing(format!("Failed to verify password: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let hasher = PasswordHasher::new(4);
        let password = "test_password123";
        let hashed = hasher.hash(password).unwrap();

        assert_ne!(hashed, password);
        assert!(hasher.verify(password, &hashed).unwrap());
        assert!(!hasher.verify("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::new(4);
        let first = hasher.hash("pw123").unwrap();
        let second = hasher.hash("pw123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_overlong_password_is_not_truncated() {
        let hasher = PasswordHasher::new(4);
        let overlong = format!("{}A", "é".repeat(36));
        assert!(matches!(hasher.hash(&overlong), Err(AuthError::Hashing(_))));
        assert!(hasher.hash(&"é".repeat(36)).is_ok());
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match PasswordHasher::new(4).verify("test_password123", "invalidhashformat") {
            Err(AuthError::Hashing(msg)) => assert!(msg.contains("Failed to verify password")),
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }
}
