use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;
use pizza_auth::AuthError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Request-level failures with their contractual status codes. Store
/// constraint violations surface as the mapped client error; only genuinely
/// unexpected failures become a 500.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("name, email, and password are required")]
    MissingFields,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("{0}")]
    NotFound(String),
    #[error("unauthorized")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

impl From<AuthError> for ServiceError {
    fn from(_: AuthError) -> Self {
        Self::Unauthenticated
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::NotFound(what) => Self::NotFound(format!("unknown {what}")),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(err) => {
                error!(error = ?err, "unexpected failure handling request");
                let body = ErrorBody {
                    message: "internal server error".to_string(),
                };
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
