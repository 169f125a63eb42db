//! Session Entity
//!
//! Server-side session referenced by the session cookie.

use std::time::Duration;

use chrono::Utc;
use kernel::id::UserId;

use crate::domain::value_object::session_token::SessionToken;

/// Current wall-clock time as Unix milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Duration as milliseconds, saturating at `i64::MAX`
pub fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    /// Expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
}

impl Session {
    /// Fresh session with a new random token
    pub fn issue(user_id: UserId, ttl: Duration, now_ms: i64) -> Self {
        Self {
            token: SessionToken::generate(),
            user_id,
            expires_at_ms: now_ms.saturating_add(duration_ms(ttl)),
        }
    }

    /// Valid while `now <= expires_at`
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at_ms
    }

    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.expires_at_ms - now_ms).max(0)
    }
}
