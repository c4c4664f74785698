//! # API crate — authentication and the notes service
//!
//! Everything between the HTTP layer and the store: credential hashing, session
//! tokens, the request gate and the owner-scoped note operations built on them.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | argon2 password hashing, HS256 session tokens, the `Authorization` gate |
//! | [`error`] | [`ApiError`], the failures a client can observe |
//! | [`service`] | [`NotesService`]: signup, login and note CRUD over any store backend |
//! | [`settings`] | layered configuration (defaults, `notes.toml`, `NOTES__*` env) |
//!
//! Input checks (username, password, title and content limits) live in a
//! private `validate` module and run before any side effect.

pub mod auth;
pub mod error;
pub mod service;
pub mod settings;
mod validate;

pub use auth::{Identity, IssuedToken};
pub use error::ApiError;
pub use service::NotesService;
pub use settings::{Backend, Settings};
