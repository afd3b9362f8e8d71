//! Daily trigger times
//!
//! The scan runs once at startup and then at each configured local
//! wall-clock time. Several times per day are allowed; the scan's own
//! due-gate turns repeat triggers on the same day into no-ops once that
//! day's pass has completed.

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone};
use relwatch_common::{Error, Result};
use std::time::Duration;

/// Trigger times used when none are configured
pub const DEFAULT_TRIGGER_TIMES: [&str; 2] = ["09:00", "21:00"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySchedule {
    /// Sorted, unique
    times: Vec<NaiveTime>,
}

impl DailySchedule {
    /// Parse `HH:MM` entries; an empty list yields the default times
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let mut times = Vec::with_capacity(entries.len().max(DEFAULT_TRIGGER_TIMES.len()));

        if entries.is_empty() {
            for entry in DEFAULT_TRIGGER_TIMES {
                times.push(parse_time(entry)?);
            }
        } else {
            for entry in entries {
                times.push(parse_time(entry.as_ref())?);
            }
        }

        times.sort();
        times.dedup();
        Ok(Self { times })
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    /// First trigger strictly after `now`
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        if let Some(time) = self.times.iter().find(|t| today.and_time(**t) > now) {
            return today.and_time(*time);
        }

        let tomorrow = today.succ_opt().unwrap_or(today);
        tomorrow.and_time(self.times[0])
    }

    /// How long to sleep from `now` until the next trigger
    pub fn delay_until_next(&self, now: DateTime<Local>) -> Duration {
        let next = self.next_after(now.naive_local());
        // A trigger inside a DST gap fires an hour later
        let target = Local
            .from_local_datetime(&next)
            .earliest()
            .unwrap_or_else(|| now + chrono::Duration::hours(1));
        (target - now).to_std().unwrap_or(Duration::ZERO)
    }
}

fn parse_time(entry: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(entry.trim(), "%H:%M")
        .map_err(|e| Error::Config(format!("Invalid schedule time '{entry}' (expected HH:MM): {e}")))
}
