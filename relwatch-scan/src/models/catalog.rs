//! Catalog entities as seen by the scan engine

use relwatch_common::ReleaseDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A followed artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowedEntity {
    /// Upstream artist identifier (watermark key)
    pub id: String,
    /// Display name, used in logs and reports
    pub name: String,
}

impl FollowedEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Release grouping requested from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseKind {
    Album,
    Single,
}

impl ReleaseKind {
    /// Kinds scanned for every artist, in fetch order
    pub const SCANNED: [ReleaseKind; 2] = [ReleaseKind::Album, ReleaseKind::Single];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseKind::Album => "album",
            ReleaseKind::Single => "single",
        }
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An album or single belonging to one artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    pub name: String,
    pub release_date: ReleaseDate,
    pub kind: ReleaseKind,
    pub track_count: u32,
}

/// Track reference accepted by the playlist append call
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRef(String);

impl TrackRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of the followed-artist listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityPage {
    pub items: Vec<FollowedEntity>,
    /// Cursor for the next page; `None` on the last page
    pub next_cursor: Option<String>,
}

/// One page of an artist's releases of a single kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleasePage {
    pub items: Vec<Release>,
    pub has_next: bool,
}
