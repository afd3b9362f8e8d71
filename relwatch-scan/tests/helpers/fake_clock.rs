//! Virtual clock: sleeping advances time instantly and is recorded

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use relwatch_scan::Clock;
use std::sync::Mutex;
use std::time::Duration;

pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Clock at `hour`:00 UTC on the given day of May 2024
    pub fn at(day: u32, hour: u32) -> Self {
        Self::new(Self::instant(day, hour))
    }

    pub fn instant(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(duration).unwrap();
    }
}
