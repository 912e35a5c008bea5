/// Route protection middleware
///
/// Reads `Authorization: Bearer <token>`, authorizes it through the
/// `AuthService` and injects the resulting `Authenticated` principal into
/// request extensions. Handlers receive it with `web::ReqData<Authenticated>`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{AuthService, TokenKind};
use crate::error::{AppError, AuthError};

/// Guard for one token kind, optionally demanding a fresh access token
#[derive(Clone)]
pub struct AuthGuard {
    auth: web::Data<AuthService>,
    kind: TokenKind,
    require_fresh: bool,
}

impl AuthGuard {
    /// Accept any usable access token
    pub fn access(auth: web::Data<AuthService>) -> Self {
        Self {
            auth,
            kind: TokenKind::Access,
            require_fresh: false,
        }
    }

    /// Accept only access tokens minted directly by a password login
    pub fn fresh(auth: web::Data<AuthService>) -> Self {
        Self {
            auth,
            kind: TokenKind::Access,
            require_fresh: true,
        }
    }

    /// Accept a usable refresh token
    pub fn refresh(auth: web::Data<AuthService>) -> Self {
        Self {
            auth,
            kind: TokenKind::Refresh,
            require_fresh: false,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGuardService {
            service: Rc::new(service),
            guard: self.clone(),
        }))
    }
}

pub struct AuthGuardService<S> {
    service: Rc<S>,
    guard: AuthGuard,
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
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
        let service = self.service.clone();
        let guard = self.guard.clone();

        Box::pin(async move {
            let token = bearer_token(&req).ok_or_else(|| {
                tracing::warn!(path = %req.path(), "Missing or invalid Authorization header");
                AppError::Auth(AuthError::MissingToken)
            })?;

            let principal = guard.auth.authorize(&token, guard.kind).await?;
            if guard.require_fresh {
                principal.require_fresh()?;
            }

            tracing::debug!(
                user_id = %principal.user_id(),
                kind = ?principal.kind(),
                "Token authorized"
            );

            req.extensions_mut().insert(principal);
            service.call(req).await
        })
    }
}
