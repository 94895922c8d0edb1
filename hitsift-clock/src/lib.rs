//! Clock abstraction for hitsift.
//!
//! The engine checks caller deadlines between compression passes and the CLI
//! stamps its output; both read time through this trait so tests stay
//! deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for reading the current time.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;

    /// Seconds since the Unix epoch.
    fn now_unix_sec(&self) -> u64 {
        self.now_millis() / 1000
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// Real system clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Mock clock fixed at one instant.
#[derive(Debug, Clone, Copy)]
pub struct MockClock {
    millis: u64,
}

impl MockClock {
    /// Create a mock clock fixed at `millis` since the epoch.
    pub fn new(millis: u64) -> Self {
        Self { millis }
    }

    /// Create a mock clock fixed at a whole number of seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self::new(secs.saturating_mul(1000))
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u64 {
        self.millis
    }
}

/// Mock clock that advances by a fixed step on every read.
///
/// Lets tests drive a deadline past expiry after a known number of checks.
#[derive(Debug)]
pub struct AdvancingClock {
    millis: AtomicU64,
    step: u64,
}

impl AdvancingClock {
    /// Start at `millis`, advancing by `step` after each read.
    pub fn new(millis: u64, step: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
            step,
        }
    }
}

impl Clock for AdvancingClock {
    fn now_millis(&self) -> u64 {
        self.millis.fetch_add(self.step, Ordering::SeqCst)
    }
}
