//! Summary of one scan invocation

use super::ScanPhase;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Today's monitoring pass already completed
    NotDue,
    /// The phase's pass ran to the end of the artist list
    Completed,
}

/// A unit (artist or release) that was skipped and will be retried later
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUnit {
    pub entity: String,
    pub release: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Phase the run executed in
    pub phase: ScanPhase,
    pub entities_total: usize,
    pub entities_visited: usize,
    pub releases_added: usize,
    pub tracks_appended: usize,
    pub skipped: Vec<SkippedUnit>,
}

impl RunReport {
    pub(crate) fn new(outcome: RunOutcome, phase: ScanPhase) -> Self {
        Self {
            outcome,
            phase,
            entities_total: 0,
            entities_visited: 0,
            releases_added: 0,
            tracks_appended: 0,
            skipped: Vec::new(),
        }
    }

    pub(crate) fn skip(
        &mut self,
        entity: &str,
        release: Option<&str>,
        reason: impl Into<String>,
    ) {
        let reason = reason.into();
        tracing::warn!(
            entity = %entity,
            release = release.unwrap_or("-"),
            reason = %reason,
            "Skipped, will retry on a later pass"
        );
        self.skipped.push(SkippedUnit {
            entity: entity.to_string(),
            release: release.map(str::to_string),
            reason,
        });
    }
}
