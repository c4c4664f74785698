//! # Store crate — persistence for users and notes
//!
//! Exposes the two storage capabilities the service layer is generic over,
//! [`CredentialStore`] and [`NoteStore`], and the backends that implement them:
//!
//! - [`MemoryStore`] — mutex-guarded maps, used in tests and for ephemeral runs.
//! - [`SqliteStore`] — sqlx over SQLite, behind the default `sqlite` feature.

pub mod error;
pub mod models;
pub mod repo;

mod memory;
pub use memory::MemoryStore;

#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

pub use error::StoreError;
pub use models::{Note, NoteId, User, UserId};
pub use repo::{CredentialStore, NoteStore};
