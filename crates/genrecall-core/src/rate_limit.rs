use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Wall clock plus a way to wait on it
#[async_trait]
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that only moves when slept on or advanced by hand
///
/// Clones share the same time, so a test can keep a handle while the
/// pipeline owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn starting_at(millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(millis)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.now.fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Minimum spacing between the start times of outbound requests
///
/// A request may start once the time since the previous one exceeds the
/// interval; exactly the interval is still too early.
///
/// The last request time is seeded from the request timestamps stored in the
/// cache, so the spacing also holds across process restarts.
pub struct RateLimiter<C: Clock> {
    clock: C,
    min_interval: Duration,
    last_request: Option<i64>,
}

impl<C: Clock> RateLimiter<C> {
    pub fn new(clock: C, min_interval: Duration) -> Self {
        Self {
            clock,
            min_interval,
            last_request: None,
        }
    }

    /// Account for a request made earlier (possibly by another process)
    pub fn observe(&mut self, request_time: i64) {
        self.last_request = Some(match self.last_request {
            Some(last) => last.max(request_time),
            None => request_time,
        });
    }

    pub fn last_request(&self) -> Option<i64> {
        self.last_request
    }

    /// Time left before the next request may start
    pub fn remaining(&self) -> Duration {
        let Some(last) = self.last_request else {
            return Duration::ZERO;
        };
        let elapsed = self.clock.now_millis().saturating_sub(last);
        let min = self.min_interval.as_millis() as i64;
        if elapsed > min {
            Duration::ZERO
        } else {
            Duration::from_millis((min - elapsed + 1) as u64)
        }
    }

    /// Wait for our turn, then record and return the start time of the new request
    pub async fn acquire(&mut self) -> i64 {
        let wait = self.remaining();
        if !wait.is_zero() {
            debug!("Query not ready yet, waiting {:?}", wait);
            self.clock.sleep(wait).await;
        }
        let now = self.clock.now_millis();
        self.observe(now);
        debug!("Next query ready!");
        now
    }
}
