//! Request gate: turns a raw `Authorization` header into an [`Identity`].
//!
//! [`authorize`] is a pure function of the header value and the issuer. It runs
//! before any protected operation; the service's note methods only accept an
//! [`Identity`], and the only way to obtain one is through this module.

use store::UserId;

use super::token::{TokenError, TokenIssuer};

/// The authenticated caller of a protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
}

impl Identity {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` (scheme matched case-insensitively) and, for older
/// clients, the bare token.
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let header = header?.trim();
    if header.is_empty() {
        return None;
    }

    match header.split_once(char::is_whitespace) {
        Some((scheme, rest)) => {
            if !scheme.eq_ignore_ascii_case("bearer") {
                return None;
            }
            let token = rest.trim();
            (!token.is_empty() && !token.contains(char::is_whitespace)).then_some(token)
        }
        None if header.eq_ignore_ascii_case("bearer") => None,
        None => Some(header),
    }
}

/// Verify the caller behind `header` against the current time.
pub fn authorize(header: Option<&str>, issuer: &TokenIssuer) -> Result<Identity, TokenError> {
    let token = extract_bearer(header).ok_or(TokenError::Missing)?;
    let verified = issuer.verify(token)?;
    Ok(Identity {
        user_id: verified.user_id,
    })
}

/// Like [`authorize`], with an explicit clock.
pub fn authorize_at(
    header: Option<&str>,
    issuer: &TokenIssuer,
    now: i64,
) -> Result<Identity, TokenError> {
    let token = extract_bearer(header).ok_or(TokenError::Missing)?;
    let verified = issuer.verify_at(token, now)?;
    Ok(Identity {
        user_id: verified.user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"gate-test-secret-at-least-32-bytes-long!", 3600)
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(extract_bearer(Some("Bearer   abc123 ")), Some("abc123"));
        assert_eq!(extract_bearer(Some("abc123")), Some("abc123"));

        assert_eq!(extract_bearer(None), None);
        assert_eq!(extract_bearer(Some("")), None);
        assert_eq!(extract_bearer(Some("Bearer ")), None);
        assert_eq!(extract_bearer(Some("Bearer")), None);
        assert_eq!(extract_bearer(Some("Basic abc123")), None);
        assert_eq!(extract_bearer(Some("Bearer a b")), None);
    }

    #[test]
    fn test_extract_bearer_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer(Some("bearer abc123")), Some("abc123"));
        assert_eq!(extract_bearer(Some("BEARER abc123")), Some("abc123"));
        assert_eq!(extract_bearer(Some("bEaReR\tabc123")), Some("abc123"));
        assert_eq!(extract_bearer(Some("bearer")), None);
        assert_eq!(extract_bearer(Some("basic abc123")), None);
    }

    #[test]
    fn test_authorize_accepts_valid_token() {
        let issuer = issuer();
        let token = issuer.issue_at(UserId(3), 60, T0).unwrap().token;
        let header = format!("Bearer {token}");

        let identity = authorize_at(Some(&header), &issuer, T0 + 1).unwrap();
        assert_eq!(identity.user_id(), UserId(3));

        // Raw token form.
        let identity = authorize_at(Some(&token), &issuer, T0 + 1).unwrap();
        assert_eq!(identity.user_id(), UserId(3));

        let lower = format!("bearer {token}");
        let identity = authorize_at(Some(&lower), &issuer, T0 + 1).unwrap();
        assert_eq!(identity.user_id(), UserId(3));
    }

    #[test]
    fn test_authorize_rejections() {
        let issuer = issuer();
        let token = issuer.issue_at(UserId(3), 60, T0).unwrap().token;
        let header = format!("Bearer {token}");

        assert_eq!(authorize(None, &issuer), Err(TokenError::Missing));
        assert_eq!(
            authorize(Some("Bearer "), &issuer),
            Err(TokenError::Missing)
        );
        assert_eq!(
            authorize(Some("Bearer garbage"), &issuer),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            authorize_at(Some(&header), &issuer, T0 + 61),
            Err(TokenError::Expired)
        );

        let foreign = TokenIssuer::new(b"someone-elses-secret-at-least-32-bytes", 60);
        assert_eq!(
            authorize_at(Some(&header), &foreign, T0 + 1),
            Err(TokenError::BadSignature)
        );
    }
}
