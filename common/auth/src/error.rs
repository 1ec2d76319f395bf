use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Credential failures. Every variant maps to the same 401 response so an
/// invalid, expired, or revoked token is indistinguishable from an absent one
/// outside of logs.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token is not a three-segment JWT")]
    Malformed,
    #[error("token signature verification failed")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("token revoked")]
    Revoked,
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match value.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::SignatureInvalid,
            _ => Self::Malformed,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "rejecting request credentials");
        let body = ErrorBody {
            message: "unauthorized",
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
