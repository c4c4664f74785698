//! Error taxonomy of the service layer.
//!
//! Every failure a client can observe is one of the variants of [`ApiError`].
//! The HTTP layer maps each to a status code; [`ApiError::public_message`] is
//! the only text that leaves the process.

use store::StoreError;

use crate::auth::{PasswordError, TokenError};

/// Main error type for service operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("username is already taken")]
    Conflict,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("unauthorized: {0}")]
    Unauthorized(TokenError),

    #[error("note not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Message safe to return to a client.
    ///
    /// Token failures collapse into one message, and internal errors carry no
    /// diagnostic detail.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Conflict => "Username is already taken".to_string(),
            Self::InvalidCredentials => "Invalid username or password".to_string(),
            Self::Unauthorized(_) => "Unauthorized".to_string(),
            Self::NotFound => "Note not found".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => Self::Conflict,
            StoreError::UnknownUser => Self::InvalidCredentials,
            // A correctly signed token for an account this store has never seen.
            StoreError::UnknownOwner(_) => Self::Unauthorized(TokenError::Malformed),
            StoreError::NotFound | StoreError::NotOwned { .. } => Self::NotFound,
            StoreError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => Self::Internal(msg),
            other => Self::Unauthorized(other),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("hashing task failed: {err}"))
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ApiError>;
