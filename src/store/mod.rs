//! Persistence of user credentials.
//!
//! `CredentialStore` is the seam between authentication and storage. The
//! store owns identifier uniqueness: `insert` must let exactly one of several
//! concurrent inserts for the same email succeed.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewUser, User};

pub use memory::InMemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Failures reported by a `CredentialStore`.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The email is already registered.
    #[error("identifier already exists: {0}")]
    Duplicate(String),

    /// The backend failed; the message is for logs only.
    #[error("database error: {0}")]
    Database(String),
}

/// Storage for user credentials, shared across workers.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persists a new user.
    ///
    /// # Errors
    /// * `Duplicate` - A user with the same email already exists
    /// * `Database` - The backend failed
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Looks a user up by email.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError>;
}
