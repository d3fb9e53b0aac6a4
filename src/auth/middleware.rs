use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use super::{AuthenticatedContext, TokenCodec, TokenError};
use crate::store::CredentialStore;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request stayed unauthenticated. Never shown to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    /// No `Authorization` header, or not a bearer credential.
    MissingCredentials,
    /// The bearer token failed to decode.
    Token(TokenError),
    /// The token is valid but its subject has no user record.
    UnknownSubject,
    /// The credential store could not be queried.
    StoreUnavailable,
}

/// Result of running the authenticator on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(AuthenticatedContext),
    Unauthenticated(UnauthenticatedReason),
}

/// Resolves the bearer token of every request into an `AuthenticatedContext`.
///
/// It never rejects a request: failures leave the request unauthenticated and
/// `RoutePolicy` decides whether that is acceptable for the path.
#[derive(Clone)]
pub struct RequestAuthenticator {
    codec: Arc<TokenCodec>,
    store: Arc<dyn CredentialStore>,
}

impl RequestAuthenticator {
    /// Builds an authenticator over the shared codec and store.
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn CredentialStore>) -> Self {
        Self { codec, store }
    }

    /// Runs the authentication steps for one `Authorization` header value.
    pub async fn authenticate(&self, authorization: Option<&str>) -> AuthOutcome {
        let token = match authorization.and_then(|value| value.strip_prefix(BEARER_PREFIX)) {
            Some(token) => token,
            None => {
                return AuthOutcome::Unauthenticated(UnauthenticatedReason::MissingCredentials)
            }
        };

        let subject = match self.codec.decode_subject(token) {
            Ok(subject) => subject,
            Err(e) => {
                log::debug!("Bearer token refused: {}", e);
                return AuthOutcome::Unauthenticated(UnauthenticatedReason::Token(e));
            }
        };

        match self.store.find_by_identifier(&subject).await {
            Ok(Some(user)) => AuthOutcome::Authenticated(AuthenticatedContext::for_user(&user)),
            Ok(None) => {
                log::debug!("Bearer token subject has no user record");
                AuthOutcome::Unauthenticated(UnauthenticatedReason::UnknownSubject)
            }
            Err(e) => {
                log::warn!("Credential store lookup failed during authentication: {}", e);
                AuthOutcome::Unauthenticated(UnauthenticatedReason::StoreUnavailable)
            }
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestAuthenticator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestAuthenticatorMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestAuthenticatorMiddleware {
            service: Rc::new(service),
            authenticator: self.clone(),
        }))
    }
}

/// Per-service instance of `RequestAuthenticator`, created by `new_transform`.
pub struct RequestAuthenticatorMiddleware<S> {
    service: Rc<S>,
    authenticator: RequestAuthenticator,
}

impl<S, B> Service<ServiceRequest> for RequestAuthenticatorMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let authenticator = self.authenticator.clone();

        Box::pin(async move {
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            if let AuthOutcome::Authenticated(context) =
                authenticator.authenticate(authorization.as_deref()).await
            {
                req.extensions_mut().insert(context);
            }

            service.call(req).await
        })
    }
}
