//! Token bucket rate limiter for grid sessions.
//!
//! Every session owns one bucket. Each inbound frame costs one token; tokens
//! refill continuously at the sustained rate and are capped at the burst size.
//!
//! Design decisions:
//! - Per-connection bucket, never shared between sessions
//! - Slow mode by delay: `admit()` sleeps until a token is available instead
//!   of rejecting the frame, and only the calling task sleeps
//! - Clock trait for deterministic testing; the default clock reads tokio's
//!   `Instant`, so tests with paused time advance it for free

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::shared::config::{ServerConfig, DEFAULT_BURST, DEFAULT_RATE_PER_SEC};

/// Clock abstraction for testability.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock backed by `tokio::time::Instant`.
#[derive(Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Rate limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiterConfig {
    /// Refill rate (tokens per second).
    pub rate_per_sec: f64,
    /// Maximum burst capacity (tokens).
    pub burst: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            rate_per_sec: DEFAULT_RATE_PER_SEC,
            burst: DEFAULT_BURST,
        }
    }
}

impl From<&ServerConfig> for RateLimiterConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            rate_per_sec: config.rate_per_sec,
            burst: config.burst,
        }
    }
}

struct Bucket {
    /// Current token count (as f64 for fractional refill).
    tokens: f64,
    /// Last refill timestamp.
    last_refill: Instant,
}

/// Longest single wait `try_acquire` reports
///
/// Keeps the wait representable for rates too small to refill a token in
/// any sensible time; `admit` simply waits again.
pub const MAX_WAIT: Duration = Duration::from_secs(3600);

/// Token bucket rate limiter.
///
/// The bucket sits behind a short-lived mutex so the limiter can be shared
/// behind an `Arc`; the owning session is the only caller of `admit`.
pub struct RateLimiter<C: Clock = TokioClock> {
    bucket: Mutex<Bucket>,
    config: RateLimiterConfig,
    clock: C,
}

impl RateLimiter<TokioClock> {
    /// Create a new rate limiter with the tokio clock.
    pub fn new(config: RateLimiterConfig) -> Self {
        Self::with_clock(config, TokioClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a new rate limiter with custom clock. The bucket starts full.
    pub fn with_clock(config: RateLimiterConfig, clock: C) -> Self {
        let now = clock.now();
        Self {
            bucket: Mutex::new(Bucket {
                tokens: config.burst as f64,
                last_refill: now,
            }),
            config,
            clock,
        }
    }

    /// Refill tokens based on elapsed time.
    fn refill(&self, bucket: &mut Bucket) {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        if elapsed.is_zero() {
            return;
        }

        let refill_amount = elapsed.as_secs_f64() * self.config.rate_per_sec;
        bucket.tokens = (bucket.tokens + refill_amount).min(self.config.burst as f64);
        bucket.last_refill = now;
    }

    /// Take one token if available.
    ///
    /// On failure nothing is consumed and the error carries how long until
    /// the next token will be available.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut bucket);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let tokens_needed = 1.0 - bucket.tokens;
            let wait = Duration::try_from_secs_f64(tokens_needed / self.config.rate_per_sec)
                .map_or(MAX_WAIT, |wait| wait.min(MAX_WAIT));
            Err(wait)
        }
    }

    /// Wait until a token is available and consume it.
    ///
    /// Returns how long the caller was held back.
    pub async fn admit(&self) -> Duration {
        let started = self.clock.now();
        loop {
            match self.try_acquire() {
                Ok(()) => return self.clock.now().saturating_duration_since(started),
                Err(wait) => tokio::time::sleep(wait).await,
            }
        }
    }

    /// Get current available tokens (for debugging/monitoring).
    pub fn available_tokens(&self) -> u32 {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut bucket);
        bucket.tokens.floor() as u32
    }
}
