use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError};
use crate::models::{NewUser, User};

/// Process-local store keyed by email. Used by tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Deletes a user, returning whether one was present.
    pub async fn remove(&self, identifier: &str) -> bool {
        self.users.write().await.remove(identifier).is_some()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        // Check and insert under one write lock.
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::Duplicate(user.email));
        }
        let user = User::new(user);
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(identifier).cloned())
    }
}
