//! Time source and sleeping
//!
//! The scan only suspends in two places: the throttle delay between remote
//! calls and the rate-limit backoff. Both go through [`Clock`] so tests can
//! run a whole scan in virtual time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock instant
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the current task for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by tokio timers
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_clock_sleep_advances_time() {
        let clock = SystemClock;
        let before = clock.now();
        clock.sleep(Duration::from_millis(10)).await;
        assert!(clock.now() > before);
    }
}
