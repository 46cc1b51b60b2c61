//! Clock abstraction for the scheduler loop.
//!
//! The scheduler only ever asks two things of a clock: what time it is and
//! to block for a while. Abstracting both behind a trait lets tests drive a
//! day of scheduling in microseconds instead of waiting for the sun.

use chrono::{DateTime, Local};
use std::time::Duration;

/// Trait for abstracting time operations.
pub trait TimeSource: Send + Sync {
    /// Get the current local time.
    fn now(&self) -> DateTime<Local>;

    /// Block for the specified duration (or simulate it).
    fn sleep(&self, duration: Duration);
}

/// Real-time implementation backed by the system clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Manually advanced clock: `sleep` fast-forwards the current time instead
/// of blocking, so a full scheduling day runs instantly.
#[cfg(any(test, feature = "testing-support"))]
pub struct ManualClock {
    current: std::sync::Mutex<DateTime<Local>>,
}

#[cfg(any(test, feature = "testing-support"))]
impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: std::sync::Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Local>) {
        *self.current.lock().unwrap() = instant;
    }
}

#[cfg(any(test, feature = "testing-support"))]
impl TimeSource for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        let step = chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        let mut current = self.current.lock().unwrap();
        *current = *current + step;
    }
}
