use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use super::AuthenticatedContext;
use crate::error::AppError;

/// Paths reachable without authentication by default.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/auth/register",
    "/auth/new-user",
    "/auth/login",
];

/// Which paths may be served to unauthenticated requests.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    public_paths: Vec<String>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_PATHS.iter().copied())
    }
}

impl AccessPolicy {
    /// Admits exactly the given paths without authentication.
    pub fn new<I, P>(public_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            public_paths: public_paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact match, ignoring one trailing slash.
    pub fn is_public(&self, path: &str) -> bool {
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };
        self.public_paths.iter().any(|public| public == path)
    }
}

/// Rejects unauthenticated requests to non-public paths with 401.
///
/// Must be registered so that it runs after `RequestAuthenticator`; with
/// actix-web that means calling `.wrap(RoutePolicy)` before
/// `.wrap(RequestAuthenticator)`.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    policy: Arc<AccessPolicy>,
}

impl RoutePolicy {
    /// Builds the middleware from a set of public paths.
    pub fn new(policy: AccessPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoutePolicy
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RoutePolicyMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoutePolicyMiddleware {
            service,
            policy: Arc::clone(&self.policy),
        }))
    }
}

/// Per-service instance of `RoutePolicy`, created by `new_transform`.
pub struct RoutePolicyMiddleware<S> {
    service: S,
    policy: Arc<AccessPolicy>,
}

impl<S, B> Service<ServiceRequest> for RoutePolicyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authenticated = req.extensions().contains::<AuthenticatedContext>();

        if authenticated || self.policy.is_public(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        log::debug!("Rejected unauthenticated request to {}", req.path());
        let response = AppError::Unauthorized("Authentication required".into()).error_response();
        Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
    }
}
