//! Data models for the scan engine

pub mod catalog;
pub mod run_report;
pub mod scan_state;

pub use catalog::{EntityPage, FollowedEntity, Release, ReleaseKind, ReleasePage, TrackRef};
pub use run_report::{RunOutcome, RunReport, SkippedUnit};
pub use scan_state::{ScanPhase, ScanState};
