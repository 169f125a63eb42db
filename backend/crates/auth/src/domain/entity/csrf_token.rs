//! CSRF Token Entity

use std::time::Duration;

use crate::domain::entity::session::{Session, duration_ms};
use crate::domain::value_object::session_token::{CsrfTokenValue, SessionToken};

/// At most one per session. Never outlives its session.
#[derive(Debug, Clone)]
pub struct CsrfToken {
    pub session_token: SessionToken,
    pub value: CsrfTokenValue,
    /// Expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
}

impl CsrfToken {
    /// Expires after `ttl` or with the session, whichever comes first.
    pub fn issue_for(session: &Session, ttl: Duration, now_ms: i64) -> Self {
        let expires_at_ms = now_ms
            .saturating_add(duration_ms(ttl))
            .min(session.expires_at_ms);

        Self {
            session_token: session.token.clone(),
            value: CsrfTokenValue::generate(),
            expires_at_ms,
        }
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at_ms
    }
}
