//! Email Value Object
//!
//! Shape check only. No DNS lookup, no confirmation mail.

use serde::Serialize;
use validator::ValidateEmail;

use crate::error::{AuthError, AuthResult};

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Email address value object. Case is kept as entered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> AuthResult<Self> {
        let email = raw.to_string();

        if email.len() > EMAIL_MAX_LENGTH || !email.validate_email() {
            return Err(AuthError::InvalidEmail);
        }

        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(Email::parse("alice@example.com").is_ok());
        assert!(Email::parse("first.last+tag@sub.example.org").is_ok());
    }

    #[test]
    fn test_case_preserved() {
        let email = Email::parse("Alice@Example.com").unwrap();
        assert_eq!(email.as_str(), "Alice@Example.com");
    }

    #[test]
    fn test_invalid_emails() {
        for raw in ["", "alice", "alice@", "@example.com", "a b@example.com", "alice@@example.com"] {
            assert!(
                matches!(Email::parse(raw), Err(AuthError::InvalidEmail)),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_too_long() {
        let raw = format!("{}@example.com", "a".repeat(250));
        assert!(Email::parse(&raw).is_err());
    }
}
