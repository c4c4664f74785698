//! # Session tokens — HS256 JWTs
//!
//! A session is not stored anywhere. At login the [`TokenIssuer`] signs a small
//! set of [`Claims`] with the process-wide secret, and every later request is
//! authenticated by re-checking that signature and the expiry.
//!
//! ## Claims
//!
//! | Claim | Meaning |
//! |-------|---------|
//! | `sub` | user id, as a decimal string |
//! | `iat` | issue time, Unix seconds |
//! | `exp` | expiry, Unix seconds |
//!
//! ## Verification order
//!
//! 1. `jsonwebtoken` decodes the header and recomputes the HMAC over header and
//!    payload. Any mismatch is [`TokenError::BadSignature`]; anything that is not
//!    a well-formed HS256 JWT is [`TokenError::Malformed`]. Nothing in the
//!    payload is trusted before this step passes.
//! 2. The expiry is compared against the caller's clock with zero leeway. A
//!    token is valid while `now < exp`.
//! 3. `sub` must parse as a user id.
//!
//! Expiry is checked here rather than by `jsonwebtoken` so the clock can be
//! injected (`*_at` methods) and the boundary is exact.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use store::UserId;

/// Reasons a token is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("no token supplied")]
    Missing,

    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

/// Payload carried inside every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// A verified token's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: UserId,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// A freshly minted token and when it stops being accepted.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Mints and checks session tokens under one secret.
///
/// Built once at startup; the secret is never rotated while the process runs.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer for `secret`. Secret strength is enforced by
    /// [`crate::settings::Settings::validate`].
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        }
    }

    /// Default lifetime of issued tokens, in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a token for `user` valid for the configured lifetime from now.
    pub fn issue(&self, user: UserId) -> Result<IssuedToken, TokenError> {
        self.issue_at(user, self.ttl_secs, now())
    }

    /// Issue a token for `user` valid for `ttl_secs` from `now`.
    pub fn issue_at(&self, user: UserId, ttl_secs: u64, now: i64) -> Result<IssuedToken, TokenError> {
        let ttl = i64::try_from(ttl_secs).map_err(|_| TokenError::Signing("ttl too large".into()))?;
        let claims = Claims {
            sub: user.0.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.verify_at(token, now())
    }

    /// Verify a token as of `now`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<VerifiedToken, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        let claims = data.claims;

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        let user_id = claims
            .sub
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| TokenError::Malformed)?;

        Ok(VerifiedToken {
            user_id,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}
