//! Monotonic clock abstraction used for deadline arithmetic and waiting.
//!
//! The poller never reads the system clock directly. Production code uses
//! [`TokioClock`]; tests use [`ManualClock`], whose `sleep` advances virtual
//! time instantly so multi-minute polling scenarios run in microseconds.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

/// Source of monotonic time plus the ability to wait on it.
///
/// `now` is the elapsed time since an arbitrary, fixed origin; only
/// differences between readings are meaningful.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Returns the elapsed time since the clock's origin.
    fn now(&self) -> Duration;

    /// Suspends the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by `tokio::time`.
///
/// Honors `tokio::time::pause()` in tests because both reading and sleeping
/// go through tokio's time driver.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock that only moves when told to.
///
/// Cloning yields a handle to the same timeline, so a test can keep one
/// handle to inspect or advance time while the poller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug, Default)]
struct ManualState {
    now: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves virtual time forward without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        self.inner.lock().now += duration;
    }

    /// Every duration passed to `sleep`, in call order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().sleeps.clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.inner.lock().now
    }

    async fn sleep(&self, duration: Duration) {
        {
            let mut state = self.inner.lock();
            state.now += duration;
            state.sleeps.push(duration);
        }
        tokio::task::yield_now().await;
    }
}
