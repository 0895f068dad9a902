//! Error types for the credential store, token handling and the auth flow.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    UsernameTaken,
    /// Unknown username and wrong password are reported the same way.
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => AuthError::UsernameTaken,
            StoreError::Database(e) => AuthError::Internal(e.into()),
        }
    }
}
