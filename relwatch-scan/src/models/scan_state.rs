//! Durable scan state
//!
//! # Phase Progression
//! BOOTSTRAPPING → MONITORING (once, never reverts)
//!
//! Persisted as pretty JSON; dates are ISO text and cursors plain numbers
//! so the checkpoint can be read and diffed by hand.

use chrono::{DateTime, Utc};
use relwatch_common::time::same_calendar_day;
use relwatch_common::ReleaseDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scan phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanPhase {
    /// Seeding the playlist with one track per artist
    #[default]
    Bootstrapping,
    /// Daily pass adding every release newer than the watermark
    Monitoring,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanState {
    pub phase: ScanPhase,

    /// Next artist index during bootstrap
    pub bootstrap_cursor: usize,

    /// Next artist index during the current day's monitoring pass
    pub monitor_cursor: usize,

    /// Newest release date fully processed, across all artists
    pub global_watermark_date: ReleaseDate,

    /// Newest release date ingested, per artist id
    pub per_entity_watermark: BTreeMap<String, ReleaseDate>,

    /// Completion of the last full pass (bootstrap or monitoring)
    pub last_run_timestamp: Option<DateTime<Utc>>,

    /// Start of the monitoring pass `monitor_cursor` belongs to
    pub pass_started_at: Option<DateTime<Utc>>,
}

impl ScanState {
    /// A run is skipped only when today's monitoring pass already finished
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        let ran_today = self
            .last_run_timestamp
            .is_some_and(|last| same_calendar_day(last, now));

        !(ran_today && self.phase == ScanPhase::Monitoring && self.monitor_cursor == 0)
    }

    /// A nonzero monitor cursor left over from a pass started on an earlier day
    pub fn has_stale_cursor(&self, now: DateTime<Utc>) -> bool {
        let started = self.pass_started_at.or(self.last_run_timestamp);
        self.monitor_cursor != 0 && !started.is_some_and(|at| same_calendar_day(at, now))
    }

    /// Drop a stale cursor and stamp the start of a fresh pass
    pub fn begin_monitoring_pass(&mut self, now: DateTime<Utc>) {
        if self.has_stale_cursor(now) {
            self.monitor_cursor = 0;
        }
        if self.monitor_cursor == 0 {
            self.pass_started_at = Some(now);
        }
    }

    /// "New enough" threshold for an artist: its own watermark, else the global one
    pub fn threshold_for(&self, entity_id: &str) -> ReleaseDate {
        self.per_entity_watermark
            .get(entity_id)
            .copied()
            .unwrap_or(self.global_watermark_date)
    }

    /// Raise both watermarks to `date` where it is newer.
    ///
    /// Returns true if anything changed.
    pub fn record_release(&mut self, entity_id: &str, date: ReleaseDate) -> bool {
        let mut changed = false;

        match self.per_entity_watermark.get_mut(entity_id) {
            Some(existing) if *existing >= date => {}
            Some(existing) => {
                *existing = date;
                changed = true;
            }
            None => {
                self.per_entity_watermark.insert(entity_id.to_string(), date);
                changed = true;
            }
        }

        if date > self.global_watermark_date {
            self.global_watermark_date = date;
            changed = true;
        }

        changed
    }

    /// Bootstrap finished: switch to monitoring for good
    pub fn complete_bootstrap(&mut self, now: DateTime<Utc>) {
        self.phase = ScanPhase::Monitoring;
        self.bootstrap_cursor = 0;
        self.monitor_cursor = 0;
        self.last_run_timestamp = Some(now);
    }

    /// Monitoring pass reached the end of the artist list
    pub fn complete_monitoring_pass(&mut self, now: DateTime<Utc>) {
        self.monitor_cursor = 0;
        self.pass_started_at = None;
        self.last_run_timestamp = Some(now);
    }
}
