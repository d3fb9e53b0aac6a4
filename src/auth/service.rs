use std::sync::Arc;

use super::{AuthError, PasswordHasher, TokenCodec};
use crate::models::{NewUser, User};
use crate::store::CredentialStore;

/// Stand-in verified when the email is unknown, so that path costs one bcrypt
/// verification like a wrong password does.
const DUMMY_PASSWORD: &str = "not-a-real-password";

/// A freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// Registration and login.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    hasher: PasswordHasher,
    dummy_hash: String,
}

impl AuthService {
    /// Builds the service and precomputes the hash used for unknown emails.
    ///
    /// # Errors
    /// * `Hashing` - The configured bcrypt cost is rejected
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        hasher: PasswordHasher,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            codec,
            hasher,
            dummy_hash,
        })
    }

    /// Hashes the password and stores a new user.
    ///
    /// # Errors
    /// * `DuplicateIdentifier` - The email is already registered
    /// * `Store` / `Hashing` - Infrastructure failures
    pub async fn register(
        &self,
        identifier: &str,
        raw_password: &str,
        name: Option<String>,
    ) -> Result<User, AuthError> {
        let password_hash = self.hasher.hash(raw_password)?;

        let user = self
            .store
            .insert(NewUser {
                email: identifier.to_string(),
                name,
                password_hash,
            })
            .await?;

        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Checks the credentials and issues a token for the identifier.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password, indistinguishably
    /// * `Store` / `Hashing` / `Token` - Infrastructure failures
    pub async fn login(
        &self,
        identifier: &str,
        raw_password: &str,
    ) -> Result<IssuedToken, AuthError> {
        let user = self.store.find_by_identifier(identifier).await?;

        let stored_hash = user
            .as_ref()
            .map_or(self.dummy_hash.as_str(), |user| user.password_hash.as_str());
        let matches = self.hasher.verify(raw_password, stored_hash)?;

        let user = match user {
            Some(user) if matches => user,
            _ => {
                log::debug!("Rejected login attempt");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.codec.issue(&user.email)?;
        log::info!("Issued token for user {}", user.id);
        Ok(IssuedToken {
            token,
            expires_in: self.codec.ttl().num_seconds(),
        })
    }
}
