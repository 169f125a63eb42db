//! Rate Limiting Infrastructure
//!
//! Per-client request counters with an idle-reset window, plus the
//! in-process store used by the HTTP rate-limit middleware.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// Silence needed before the counter resets
    pub retry_after: Duration,
}

/// Error type shared by rate limit backends
pub type RateLimitError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Record one request for `key` and decide whether it may proceed.
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

#[derive(Debug, Clone, Copy)]
struct Visitor {
    last_seen: Instant,
    count: u32,
}

/// In-process visitor table.
///
/// A visitor's count resets to 1 when it has been silent for longer than
/// the window; otherwise every request increments it. The lock is held
/// only for the read-modify-write of a single entry.
#[derive(Debug)]
pub struct MemoryRateLimitStore {
    visitors: Mutex<HashMap<String, Visitor>>,
    idle_after: Duration,
}

impl MemoryRateLimitStore {
    /// `idle_after` is how long a visitor may stay silent before the
    /// cleaner forgets it. Use the limiter window.
    pub fn new(idle_after: Duration) -> Self {
        Self {
            visitors: Mutex::new(HashMap::new()),
            idle_after,
        }
    }

    fn record(&self, key: &str, config: &RateLimitConfig, now: Instant) -> RateLimitResult {
        let count = {
            let mut visitors = self.visitors.lock().unwrap_or_else(PoisonError::into_inner);
            let visitor = visitors.entry(key.to_string()).or_insert(Visitor {
                last_seen: now,
                count: 0,
            });

            if now.duration_since(visitor.last_seen) > config.window {
                visitor.count = 1;
            } else {
                visitor.count = visitor.count.saturating_add(1);
            }
            visitor.last_seen = now;
            visitor.count
        };

        RateLimitResult {
            allowed: count <= config.max_requests,
            remaining: config.max_requests.saturating_sub(count),
            retry_after: config.window,
        }
    }

    /// Drop visitors silent for longer than `idle_after`. Returns how many were removed.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut visitors = self.visitors.lock().unwrap_or_else(PoisonError::into_inner);
        let before = visitors.len();
        visitors.retain(|_, v| now.duration_since(v.last_seen) <= self.idle_after);
        before - visitors.len()
    }

    pub fn len(&self) -> usize {
        self.visitors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict idle visitors every `period` until `cancel` fires.
    pub fn spawn_cleaner(
        self: &Arc<Self>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // 初回 tick は即時に完了するので読み捨てる
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("rate limit cleaner stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let evicted = store.evict_idle();
                        if evicted > 0 {
                            tracing::debug!(evicted, "evicted idle rate limit visitors");
                        }
                    }
                }
            }
        })
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.record(key, config, Instant::now()))
    }
}
