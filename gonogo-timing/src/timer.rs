use std::future::Future;
use std::time::Duration;

/// Monotonic clock that can also suspend the caller.
///
/// Timestamps are nanoseconds since the clock's origin. Delayed wake-ups are the only
/// suspension points the trial logic uses, so swapping the clock is enough to run a
/// session against simulated time.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> u64;

    /// Resolves once, `d` after it is first polled.
    fn after(&self, d: Duration) -> impl Future<Output = ()> + Send + 'static;

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    /// Resolves once the clock reads at least `ts`.
    fn at(&self, ts: u64) -> impl Future<Output = ()> + Send + 'static {
        self.after(Duration::from_nanos(ts.saturating_sub(self.now())))
    }
}

/// Clock backed by the tokio timer.
///
/// Under a paused runtime (`start_paused`) tokio jumps straight to the next pending
/// timer, which makes this the deterministic clock as well.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
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

impl Clock for TokioClock {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn after(&self, d: Duration) -> impl Future<Output = ()> + Send + 'static {
        tokio::time::sleep(d)
    }

    fn at(&self, ts: u64) -> impl Future<Output = ()> + Send + 'static {
        tokio::time::sleep_until(self.origin + Duration::from_nanos(ts))
    }
}
