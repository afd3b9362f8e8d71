//! Test Helper Utilities
//!
//! Shared fakes for exercising the scan engine without a network

#![allow(dead_code)]

pub mod fake_catalog;
pub mod fake_clock;

pub use fake_catalog::FakeCatalog;
pub use fake_clock::FakeClock;

use relwatch_common::ReleaseDate;
use relwatch_scan::models::{FollowedEntity, Release, ReleaseKind, TrackRef};
use relwatch_scan::ScanConfig;
use std::path::Path;
use std::time::Duration;

pub const PLAYLIST: &str = "playlist-1";

/// Config pointing at `dir`, with no throttle delay
pub fn test_config(dir: &Path) -> ScanConfig {
    let mut config = ScanConfig::new(PLAYLIST, dir.join("scan_state.json"));
    config.throttle = Duration::ZERO;
    config
}

pub fn artist(id: &str) -> FollowedEntity {
    FollowedEntity::new(id, format!("Artist {id}"))
}

pub fn date(text: &str) -> ReleaseDate {
    text.parse().expect("valid test date")
}

pub fn album(id: &str, release_date: &str, track_count: u32) -> Release {
    release(id, release_date, ReleaseKind::Album, track_count)
}

pub fn single(id: &str, release_date: &str) -> Release {
    release(id, release_date, ReleaseKind::Single, 1)
}

pub fn release(id: &str, release_date: &str, kind: ReleaseKind, track_count: u32) -> Release {
    Release {
        id: id.to_string(),
        name: format!("Release {id}"),
        release_date: date(release_date),
        kind,
        track_count,
    }
}

/// `n` distinct track refs named after `release_id`
pub fn tracks(release_id: &str, n: usize) -> Vec<TrackRef> {
    (1..=n)
        .map(|i| TrackRef::new(format!("spotify:track:{release_id}-{i}")))
        .collect()
}
