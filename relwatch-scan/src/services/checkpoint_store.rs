//! Checkpoint store
//!
//! Single source of truth for "where did we leave off". The whole
//! [`ScanState`] is written on every save via temp file + rename, so a crash
//! mid-write leaves the previous checkpoint intact.
//!
//! Loading never fails a run: a missing checkpoint yields the default state,
//! and an unreadable one is moved aside to `<name>.corrupt` and replaced by
//! the default state (bootstrap restarts).

use crate::models::{ScanPhase, ScanState};
use relwatch_common::atomic_file::write_atomic;
use relwatch_common::{ReleaseDate, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Single-field checkpoint format from earlier releases
#[derive(Debug, Deserialize)]
struct LegacyCheckpoint {
    last_checked_date: String,
}

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted state, degrading to the default state
    pub fn load(&self) -> ScanState {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No checkpoint yet, starting fresh");
                return ScanState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Checkpoint unreadable, starting fresh");
                return ScanState::default();
            }
        };

        match decode(&bytes) {
            Ok(state) => {
                debug!(
                    phase = ?state.phase,
                    bootstrap_cursor = state.bootstrap_cursor,
                    monitor_cursor = state.monitor_cursor,
                    "Checkpoint loaded"
                );
                state
            }
            Err(reason) => {
                warn!(
                    path = %self.path.display(),
                    reason = %reason,
                    "Checkpoint corrupt, restarting from default state"
                );
                self.quarantine();
                ScanState::default()
            }
        }
    }

    /// Persist the full state atomically
    pub fn save(&self, state: &ScanState) -> Result<()> {
        let json = serde_json::to_vec_pretty(state)?;
        write_atomic(&self.path, &json)
    }

    fn quarantine(&self) {
        let mut aside = self.path.clone().into_os_string();
        aside.push(".corrupt");
        if let Err(e) = std::fs::rename(&self.path, &aside) {
            warn!(error = %e, "Could not move corrupt checkpoint aside");
        }
    }
}

fn decode(bytes: &[u8]) -> std::result::Result<ScanState, String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

    let is_legacy = value.get("last_checked_date").is_some() && value.get("phase").is_none();
    if is_legacy {
        let legacy: LegacyCheckpoint = serde_json::from_value(value).map_err(|e| e.to_string())?;
        return migrate_legacy(&legacy);
    }

    if !value.is_object() {
        return Err("checkpoint is not a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// The legacy script had already filled the playlist, so it resumes in monitoring
fn migrate_legacy(legacy: &LegacyCheckpoint) -> std::result::Result<ScanState, String> {
    let watermark =
        ReleaseDate::parse_lenient(&legacy.last_checked_date).map_err(|e| e.to_string())?;
    info!(watermark = %watermark, "Migrating legacy checkpoint");

    Ok(ScanState {
        phase: ScanPhase::Monitoring,
        global_watermark_date: watermark,
        ..Default::default()
    })
}
