use async_trait::async_trait;
use sqlx::PgPool;

use super::{CredentialStore, StoreError};
use crate::models::{NewUser, User};

/// `CredentialStore` backed by the `users` table.
///
/// Uniqueness comes from the `users_email_key` constraint, so concurrent
/// registrations race inside PostgreSQL rather than in this process.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let user = User::new(user);

        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, name, password_hash, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, email, name, password_hash, created_at",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StoreError::Duplicate(user.email.clone());
                }
            }
            StoreError::Database(e.to_string())
        })
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))
    }
}
