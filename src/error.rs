//! HTTP-facing error type. Domain errors are converted here and nowhere else.

use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::errors::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Summarization failed: {0}")]
    Summarizer(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

/// Error body, shaped as `{"detail": "..."}`.
#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::UsernameTaken | ApiError::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Summarizer(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UsernameTaken => ApiError::UsernameTaken,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::InvalidToken => ApiError::Unauthorized("Invalid or expired token".into()),
            AuthError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Internal(e) => tracing::error!(error = ?e, %status, "internal error"),
            ApiError::Summarizer(e) => tracing::error!(error = %e, %status, "summarizer error"),
            other => tracing::debug!(error = %other, %status, "client error"),
        }

        let body = Json(ErrorBody {
            detail: self.to_string(),
        });
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::UsernameTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Summarizer("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_errors_map_to_boundary_errors() {
        assert!(matches!(
            ApiError::from(AuthError::InvalidToken),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::UsernameTaken),
            ApiError::UsernameTaken
        ));
        assert!(matches!(
            ApiError::from(AuthError::Internal(anyhow::anyhow!("boom"))),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn unauthorized_carries_bearer_challenge() {
        let res = ApiError::Unauthorized("Invalid or expired token".into()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn internal_error_hides_cause() {
        let err = ApiError::Internal(anyhow::anyhow!("db password is hunter2"));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
