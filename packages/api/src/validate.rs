//! Boundary checks on client input. Each check runs before any side effect.

use crate::error::{ApiError, Result};

pub const MAX_USERNAME_CHARS: usize = 64;
pub const MAX_PASSWORD_BYTES: usize = 1024;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_BYTES: usize = 64 * 1024;

pub fn username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(ApiError::Validation("Username is required".into()));
    }
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(ApiError::Validation(format!(
            "Username must be at most {MAX_USERNAME_CHARS} characters"
        )));
    }
    if username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ApiError::Validation(
            "Username must not contain whitespace".into(),
        ));
    }
    Ok(())
}

pub fn password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(ApiError::Validation("Password is required".into()));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

pub fn note(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::Validation(format!(
            "Title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    if content.len() > MAX_CONTENT_BYTES {
        return Err(ApiError::Validation(format!(
            "Content must be at most {MAX_CONTENT_BYTES} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(username("alice").is_ok());
        assert!(username("alice.b-c_9").is_ok());
        assert!(username("").is_err());
        assert!(username("al ice").is_err());
        assert!(username("alice\n").is_err());
        assert!(username(&"a".repeat(MAX_USERNAME_CHARS)).is_ok());
        assert!(username(&"a".repeat(MAX_USERNAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(password("pw123").is_ok());
        assert!(password("").is_err());
        assert!(password(&"x".repeat(MAX_PASSWORD_BYTES + 1)).is_err());
    }

    #[test]
    fn test_note_rules() {
        assert!(note("T", "C").is_ok());
        assert!(note("T", "").is_ok());
        assert!(note("   ", "C").is_err());
        assert!(note(&"t".repeat(MAX_TITLE_CHARS + 1), "").is_err());
        assert!(note("T", &"c".repeat(MAX_CONTENT_BYTES + 1)).is_err());
    }
}
