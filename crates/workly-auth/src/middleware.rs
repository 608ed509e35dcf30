//! Access guard for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::debug;
use workly_db::{Company, User};

use crate::error::AuthError;
use crate::jwt::{CredentialCodec, PrincipalKind};
use crate::principal::{Principal, PrincipalResolver, PrincipalStore};

/// Authenticated user, attached to request extensions by the user guard
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authenticated company, attached to request extensions by the company guard
#[derive(Debug, Clone)]
pub struct CurrentCompany(pub Company);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingCredential)
    }
}

impl<S> FromRequestParts<S> for CurrentCompany
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentCompany>()
            .cloned()
            .ok_or(AuthError::MissingCredential)
    }
}

/// Gate for one principal kind: reads that kind's cookie, verifies the token
/// with that kind's codec and loads the principal.
#[derive(Clone)]
pub struct Guard {
    codec: CredentialCodec,
    resolver: PrincipalResolver,
}

impl Guard {
    pub fn new(codec: CredentialCodec, store: Arc<dyn PrincipalStore>) -> Self {
        Self {
            codec,
            resolver: PrincipalResolver::new(store),
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        self.codec.kind()
    }

    /// Codec used to issue tokens at login
    pub fn codec(&self) -> &CredentialCodec {
        &self.codec
    }

    /// Turn the request cookies into a principal of this guard's kind
    pub async fn authenticate(&self, jar: &CookieJar) -> Result<Principal, AuthError> {
        let token = jar
            .get(self.kind().cookie_name())
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let claims = self.codec.verify(token)?;
        self.resolver.resolve(&claims).await
    }
}

/// Authentication middleware
///
/// Rejects the request unless it carries a valid cookie for the guard's kind
/// naming an existing principal. On success the principal is inserted into
/// request extensions as [`CurrentUser`] or [`CurrentCompany`].
pub async fn require_principal(
    State(guard): State<Arc<Guard>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = match guard.authenticate(&jar).await {
        Ok(principal) => principal,
        Err(e) => {
            debug!("Rejected {} request to {}: {}", guard.kind(), request.uri().path(), e);
            return Err(e);
        }
    };

    debug!("Authenticated {} {}", principal.kind(), principal.id());

    match principal {
        Principal::User(user) => {
            request.extensions_mut().insert(CurrentUser(user));
        }
        Principal::Company(company) => {
            request.extensions_mut().insert(CurrentCompany(company));
        }
    }

    Ok(next.run(request).await)
}
