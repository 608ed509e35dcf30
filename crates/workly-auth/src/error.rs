//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing authentication cookie")]
    MissingCredential,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Malformed token claims")]
    MalformedClaims,

    #[error("Principal not found")]
    PrincipalNotFound,

    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Principal store error: {0}")]
    Store(String),

    #[error("Token signing error: {0}")]
    Signing(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingCredential
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::MalformedClaims
            | AuthError::PrincipalNotFound => StatusCode::UNAUTHORIZED,
            AuthError::MissingSecret
            | AuthError::PasswordHash(_)
            | AuthError::Store(_)
            | AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Authentication failure: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
