//! Errors reported by [`crate::CredentialStore`] and [`crate::NoteStore`] backends.

use crate::models::UserId;

/// Failure of a store operation.
///
/// [`StoreError::NotFound`] and [`StoreError::NotOwned`] are kept apart so the
/// caller can audit cross-owner access; callers facing a client must treat them
/// the same way.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username is already taken")]
    DuplicateUsername,

    #[error("no user with that username")]
    UnknownUser,

    #[error("owner {0} does not exist")]
    UnknownOwner(UserId),

    #[error("note not found")]
    NotFound,

    #[error("note belongs to user {owner}")]
    NotOwned { owner: UserId },

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Backend(format!("migration failed: {err}"))
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
