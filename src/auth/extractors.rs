use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use serde::Serialize;
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;

/// The resolved principal of an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// Request-scoped authentication state.
///
/// `RequestAuthenticator` inserts it into the request extensions once the
/// bearer token and its subject check out; it is dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedContext {
    pub user: AuthenticatedUser,
    pub authorities: Vec<String>,
}

impl AuthenticatedContext {
    pub fn for_user(user: &User) -> Self {
        Self {
            user: AuthenticatedUser {
                id: user.id,
                email: user.email.clone(),
                name: user.name.clone(),
            },
            authorities: user.authorities(),
        }
    }

    /// The token subject, i.e. the user's email.
    pub fn subject(&self) -> &str {
        &self.user.email
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

/// Extracts the `AuthenticatedContext` placed in the request extensions.
///
/// Fails with `AppError::Unauthorized` on requests that were not
/// authenticated. Public handlers can take `Option<AuthenticatedContext>`.
impl FromRequest for AuthenticatedContext {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedContext>().cloned() {
            Some(context) => ready(Ok(context)),
            None => {
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn context() -> AuthenticatedContext {
        AuthenticatedContext::for_user(&User::new(NewUser {
            email: "alice@example.com".to_string(),
            name: None,
            password_hash: "hash".to_string(),
        }))
    }

    #[actix_rt::test]
    async fn test_authenticated_context_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(context());

        let mut payload = Payload::None;
        let extracted = AuthenticatedContext::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(extracted.subject(), "alice@example.com");
        assert!(extracted.has_authority("user"));
        assert!(!extracted.has_authority("admin"));
    }

    #[actix_rt::test]
    async fn test_authenticated_context_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let result = AuthenticatedContext::from_request(&req, &mut payload).await;
        let err = result.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_optional_context_on_anonymous_request() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let extracted = Option::<AuthenticatedContext>::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert!(extracted.is_none());
    }
}
