//! # Domain records for users and notes
//!
//! Defines the rows the stores hand back to the service layer. Identifiers are
//! integer newtypes so a [`UserId`] can never be passed where a [`NoteId`] is
//! expected, while still serialising as plain numbers on the wire.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`User`] | A registered account. Carries the argon2 `password_hash`, so it is **not** `Serialize`; its `Debug` output redacts the hash. |
//! | [`Note`] | A single text note. `owner_id` is a non-owning back-reference to the [`User`] that created it. |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a user at signup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Identifier assigned to a note at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered account as stored by a [`crate::CredentialStore`].
#[derive(Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// PHC-format digest; never leaves the service boundary.
    pub password_hash: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// A note owned by exactly one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub owner_id: UserId,
}
