//! Authentication: password hashing, session tokens and the request gate.

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{authorize, authorize_at, extract_bearer, Identity};
pub use password::{Hasher, PasswordError};
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer, VerifiedToken};
