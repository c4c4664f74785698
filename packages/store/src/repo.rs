//! # Storage capabilities consumed by the service layer
//!
//! The service never talks to a concrete backend. It is generic over the two
//! async traits defined here, and the binary picks an implementation at startup:
//!
//! | Backend | Module | Concurrency control |
//! |---------|--------|---------------------|
//! | [`crate::MemoryStore`] | [`crate::memory`] | one `Mutex` per table, held only for the map access |
//! | [`crate::SqliteStore`] | [`crate::sqlite`] | SQLite's own locking; no lock in this crate |
//!
//! ## [`CredentialStore`]
//!
//! `create_user` must make the uniqueness check and the insert one atomic step,
//! so two racing signups for the same name cannot both succeed. `find_user`
//! returns the stored digest for the password check at login.
//!
//! ## [`NoteStore`]
//!
//! Every method takes the owner's [`UserId`]. A note that exists but belongs to
//! someone else is reported as [`StoreError::NotOwned`](crate::StoreError::NotOwned),
//! never returned. Each call is atomic on its own; a `get` followed by an
//! `update` from the same caller is not, and may interleave with a concurrent
//! `delete`.
//!
//! All futures are `Send` so handlers can run on a multi-threaded runtime.

use std::future::Future;

use crate::error::Result;
use crate::models::{Note, NoteId, User, UserId};

/// Username → password-hash mapping.
pub trait CredentialStore {
    fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<UserId>> + Send;

    fn find_user(&self, username: &str) -> impl Future<Output = Result<User>> + Send;
}

/// Owner-scoped note collection.
pub trait NoteStore {
    fn create_note(
        &self,
        owner: UserId,
        title: &str,
        content: &str,
    ) -> impl Future<Output = Result<Note>> + Send;

    /// Notes of `owner`, ordered by id.
    fn list_notes(&self, owner: UserId) -> impl Future<Output = Result<Vec<Note>>> + Send;

    fn get_note(&self, owner: UserId, id: NoteId) -> impl Future<Output = Result<Note>> + Send;

    fn update_note(
        &self,
        owner: UserId,
        id: NoteId,
        title: &str,
        content: &str,
    ) -> impl Future<Output = Result<Note>> + Send;

    fn delete_note(&self, owner: UserId, id: NoteId) -> impl Future<Output = Result<()>> + Send;
}
