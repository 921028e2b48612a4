//! Token-bucket governor for the remote file-store API.
//!
//! One synchronized bucket per process, shared by every worker. `acquire`
//! never fails; it blocks until a token is available, bounding the call rate
//! instead of rejecting callers. On top of the continuous bucket there is a
//! forced pause once per minute: the remote side measures quota with some
//! skew, so after each full minute of wall clock the bucket sits out a fixed
//! pause and restarts full.
//!
//! Uses `tokio::time` throughout so tests can drive a simulated clock.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Refill window: the bucket regains its full capacity per this interval.
const REFILL_WINDOW_SECS: f64 = 60.0;
/// Forced pause applied once per elapsed refill window.
const RESET_PAUSE: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
    last_reset: Instant,
}

impl Bucket {
    fn refill(&mut self, capacity: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * capacity / REFILL_WINDOW_SECS).min(capacity);
        self.last_refill = now;
    }
}

/// Shared rate limiter. Callers from any number of tasks go through the same
/// bucket; mutation happens under one lock, and the lock is held across the
/// waits so a blocked acquire cannot be overtaken.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// `capacity` is the quota per minute (tokens). Starts full.
    pub fn new(capacity: u32) -> Self {
        let now = Instant::now();
        Self {
            capacity: f64::from(capacity.max(1)),
            bucket: Mutex::new(Bucket {
                tokens: f64::from(capacity.max(1)),
                last_refill: now,
                last_reset: now,
            }),
        }
    }

    /// Block until one unit of quota is available, then debit it.
    ///
    /// Always eventually succeeds; there is no error path and no
    /// cancellation of a blocked acquire.
    pub async fn acquire(&self) {
        let mut bucket = self.bucket.lock().await;

        if Instant::now().duration_since(bucket.last_reset).as_secs_f64() >= REFILL_WINDOW_SECS {
            tracing::info!(
                pause_secs = RESET_PAUSE.as_secs(),
                "rate window elapsed, pausing before refilling bucket"
            );
            sleep(RESET_PAUSE).await;
            let now = Instant::now();
            bucket.tokens = self.capacity;
            bucket.last_refill = now;
            bucket.last_reset = now;
        }

        bucket.refill(self.capacity);
        while bucket.tokens < 1.0 {
            let wait = (1.0 - bucket.tokens) * REFILL_WINDOW_SECS / self.capacity;
            tracing::debug!(wait_secs = wait, "token bucket empty, waiting");
            sleep(Duration::from_secs_f64(wait)).await;
            bucket.refill(self.capacity);
        }
        bucket.tokens -= 1.0;

        let usage = (1.0 - bucket.tokens / self.capacity) * 100.0;
        tracing::trace!(usage_pct = usage, remaining = bucket.tokens, "token acquired");
    }

    /// Fraction of the quota currently in use (0.0..=1.0), for reporting.
    pub async fn usage(&self) -> f64 {
        let bucket = self.bucket.lock().await;
        1.0 - bucket.tokens / self.capacity
    }
}
