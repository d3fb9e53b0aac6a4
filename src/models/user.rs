use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Authority granted to every registered account.
pub const DEFAULT_AUTHORITY: &str = "user";

/// A stored account. The email address is the login identifier.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Data needed to create a `User`; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

impl User {
    /// Builds a fresh record with a new id and the current timestamp.
    pub fn new(input: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: input.email,
            name: input.name,
            password_hash: input.password_hash,
            created_at: Utc::now(),
        }
    }

    /// Authorities attached to an authenticated request for this user.
    pub fn authorities(&self) -> Vec<String> {
        vec![DEFAULT_AUTHORITY.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new(NewUser {
            email: "test@example.com".to_string(),
            name: Some("Test".to_string()),
            password_hash: "$2b$04$hash".to_string(),
        });

        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.name.as_deref(), Some("Test"));
        assert_eq!(user.authorities(), vec!["user".to_string()]);

        let other = User::new(NewUser {
            email: "other@example.com".to_string(),
            name: None,
            password_hash: "$2b$04$hash".to_string(),
        });
        assert_ne!(user.id, other.id);
    }
}
