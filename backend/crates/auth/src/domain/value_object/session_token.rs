//! Session and CSRF token values
//!
//! Both are opaque random strings. `Debug` never prints them.

use std::fmt;

use platform::crypto::{constant_time_eq, random_token};

/// Random bytes behind a session token
pub const SESSION_TOKEN_BYTES: usize = 16;
/// Random bytes behind a CSRF token
pub const CSRF_TOKEN_BYTES: usize = 32;

/// Session identifier carried in the session cookie
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(random_token(SESSION_TOKEN_BYTES))
    }

    /// Wrap a value read from a cookie or a database row
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Anti-forgery token bound to one session
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfTokenValue(String);

impl CsrfTokenValue {
    pub fn generate() -> Self {
        Self(random_token(CSRF_TOKEN_BYTES))
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison with a client-supplied value
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), candidate.as_bytes())
    }
}

impl fmt::Debug for CsrfTokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfTokenValue([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_distinct() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();
        assert_ne!(a, b);
        // 16 bytes, base64url without padding
        assert_eq!(a.as_str().len(), 22);
        assert_eq!(CsrfTokenValue::generate().as_str().len(), 43);
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = SessionToken::from_raw("secret-value");
        assert!(!format!("{token:?}").contains("secret-value"));
        let csrf = CsrfTokenValue::from_raw("secret-value");
        assert!(!format!("{csrf:?}").contains("secret-value"));
    }

    #[test]
    fn test_csrf_matches() {
        let csrf = CsrfTokenValue::from_raw("abc");
        assert!(csrf.matches("abc"));
        assert!(!csrf.matches("abd"));
        assert!(!csrf.matches(""));
    }
}
