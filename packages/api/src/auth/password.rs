//! # Password hashing and verification — Argon2id
//!
//! [`Hasher`] wraps the `argon2` crate with a configurable cost:
//!
//! - [`Hasher::hash`] — generates a random salt via [`OsRng`], hashes the
//!   plaintext with Argon2id and returns a PHC-format string
//!   (`$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`). The salt and the cost
//!   parameters travel inside that string, which is what the credential store
//!   keeps in `password_hash`.
//!
//! - [`Hasher::verify`] — parses a PHC string, recomputes the hash with the
//!   embedded salt and parameters, and compares outputs in constant time.
//!   Returns `Ok(false)` on mismatch and `Err` if the stored digest is malformed.
//!
//! - [`Hasher::verify_decoy`] — runs one full verification against a fixed
//!   digest so a login for an unknown username costs the same as a wrong
//!   password. The digest is computed in [`Hasher::new`] with the configured
//!   cost, so the first such login is no slower than later ones.
//!
//! Both operations are CPU-bound; callers run them on the blocking thread pool
//! and never while holding a store lock.

use std::fmt;
use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Failure inside the hasher. Never means "wrong password".
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid argon2 parameters: {0}")]
    Params(String),

    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("invalid password hash: {0}")]
    InvalidDigest(String),
}

/// Argon2id hasher with a fixed cost.
#[derive(Clone)]
pub struct Hasher {
    params: Params,
    decoy: Arc<str>,
}

const DECOY_PASSWORD: &str = "decoy password for unknown accounts";

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl Hasher {
    /// Build a hasher from memory (KiB), iteration and lane counts.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        let mut hasher = Self {
            params,
            decoy: Arc::from(""),
        };
        hasher.decoy = hasher.hash(DECOY_PASSWORD)?.into();
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password. Returns a PHC-format string.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Verify a password against a PHC-format hash string.
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError> {
        let parsed =
            PasswordHash::new(digest).map_err(|e| PasswordError::InvalidDigest(e.to_string()))?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::InvalidDigest(e.to_string())),
        }
    }

    /// Spend one verification's worth of work and report a mismatch.
    pub fn verify_decoy(&self, password: &str) -> Result<bool, PasswordError> {
        self.verify(password, &self.decoy)?;
        Ok(false)
    }
}
