//! Minimum-interval rate limiting with an injectable clock.
//!
//! Each provider gets its own [`IntervalLimiter`]. The limiter never sleeps on
//! its first acquisition, and a zero interval disables it entirely.
//! [`ManualClock`] lets the spacing be verified without real waiting.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Source of time for the limiter.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall-clock time backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual time: `sleep` returns immediately after advancing the clock and
/// recording the requested duration.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    state: Mutex<ManualState>,
}

#[derive(Debug, Default)]
struct ManualState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new(ManualState::default()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.state.lock().unwrap().elapsed += by;
    }

    /// Every duration passed to [`Clock::sleep`], in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().unwrap().sleeps.clone()
    }

    pub fn elapsed(&self) -> Duration {
        self.state.lock().unwrap().elapsed
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.state.lock().unwrap().elapsed
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap();
        state.elapsed += duration;
        state.sleeps.push(duration);
    }
}

#[async_trait]
impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }
}

/// Guarantees at least `min_interval` between successive [`acquire`](Self::acquire) returns.
pub struct IntervalLimiter<C = TokioClock> {
    clock: C,
    min_interval: Duration,
    last: tokio::sync::Mutex<Option<Instant>>,
}

impl IntervalLimiter<TokioClock> {
    pub fn wall_clock(min_interval: Duration) -> Self {
        Self::new(min_interval, TokioClock)
    }
}

impl<C: Clock> IntervalLimiter<C> {
    pub fn new(min_interval: Duration, clock: C) -> Self {
        Self {
            clock,
            min_interval,
            last: tokio::sync::Mutex::new(None),
        }
    }

    /// Waits until the interval since the previous acquisition has elapsed.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            let now = self.clock.now();
            if ready_at > now {
                let wait = ready_at - now;
                debug!(wait_ms = wait.as_millis() as u64, "Rate limiter: waiting");
                self.clock.sleep(wait).await;
            }
        }
        *last = Some(self.clock.now());
    }
}
