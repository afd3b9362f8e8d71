//! Scripted in-memory catalog
//!
//! Artists, releases and tracklists are seeded by the test. Errors can be
//! injected per call type: listing errors are consumed one per call, while
//! release/track errors stick until cleared. Successful appends are recorded.

use async_trait::async_trait;
use relwatch_scan::models::{EntityPage, FollowedEntity, Release, ReleaseKind, ReleasePage, TrackRef};
use relwatch_scan::services::CatalogClient;
use relwatch_scan::CatalogError;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub list_followed: usize,
    pub list_releases: usize,
    pub list_tracks: usize,
    pub append_tracks: usize,
}

#[derive(Default)]
struct Inner {
    entities: Vec<FollowedEntity>,
    releases: HashMap<String, Vec<Release>>,
    tracks: HashMap<String, Vec<TrackRef>>,
    listing_errors: VecDeque<CatalogError>,
    release_errors: HashMap<String, CatalogError>,
    track_errors: HashMap<String, CatalogError>,
    append_script: VecDeque<Result<(), CatalogError>>,
    appended: Vec<(String, Vec<TrackRef>)>,
    /// Every listing page reports this cursor as "next"
    stuck_cursor: Option<String>,
    calls: CallCounts,
}

#[derive(Default)]
pub struct FakeCatalog {
    inner: Mutex<Inner>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(entities: Vec<FollowedEntity>) -> Self {
        let catalog = Self::new();
        catalog.inner.lock().unwrap().entities = entities;
        catalog
    }

    pub fn set_entities(&self, entities: Vec<FollowedEntity>) {
        self.inner.lock().unwrap().entities = entities;
    }

    /// Add a release (with its tracklist) to an artist
    pub fn add_release(&self, entity_id: &str, release: Release, tracks: Vec<TrackRef>) {
        let mut inner = self.inner.lock().unwrap();
        inner.tracks.insert(release.id.clone(), tracks);
        inner
            .releases
            .entry(entity_id.to_string())
            .or_default()
            .push(release);
    }

    pub fn push_listing_error(&self, error: CatalogError) {
        self.inner.lock().unwrap().listing_errors.push_back(error);
    }

    pub fn fail_releases(&self, entity_id: &str, error: CatalogError) {
        self.inner
            .lock()
            .unwrap()
            .release_errors
            .insert(entity_id.to_string(), error);
    }

    pub fn clear_release_errors(&self) {
        self.inner.lock().unwrap().release_errors.clear();
    }

    pub fn fail_tracks(&self, release_id: &str, error: CatalogError) {
        self.inner
            .lock()
            .unwrap()
            .track_errors
            .insert(release_id.to_string(), error);
    }

    pub fn clear_track_errors(&self) {
        self.inner.lock().unwrap().track_errors.clear();
    }

    /// Outcomes for the next append calls, in order; unscripted calls succeed
    pub fn script_appends(&self, outcomes: Vec<Result<(), CatalogError>>) {
        self.inner.lock().unwrap().append_script.extend(outcomes);
    }

    pub fn set_stuck_cursor(&self, cursor: &str) {
        self.inner.lock().unwrap().stuck_cursor = Some(cursor.to_string());
    }

    /// Each successful append call: (playlist, tracks)
    pub fn append_calls(&self) -> Vec<(String, Vec<TrackRef>)> {
        self.inner.lock().unwrap().appended.clone()
    }

    /// All appended tracks, flattened in append order
    pub fn appended_tracks(&self) -> Vec<TrackRef> {
        self.inner
            .lock()
            .unwrap()
            .appended
            .iter()
            .flat_map(|(_, tracks)| tracks.iter().cloned())
            .collect()
    }

    pub fn calls(&self) -> CallCounts {
        self.inner.lock().unwrap().calls
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn list_followed(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<EntityPage, CatalogError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.list_followed += 1;

        if let Some(error) = inner.listing_errors.pop_front() {
            return Err(error);
        }

        let start = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let start = start.min(inner.entities.len());
        let end = (start + page_size as usize).min(inner.entities.len());

        let next_cursor = match &inner.stuck_cursor {
            Some(stuck) => Some(stuck.clone()),
            None if end < inner.entities.len() => Some(end.to_string()),
            None => None,
        };

        Ok(EntityPage {
            items: inner.entities[start..end].to_vec(),
            next_cursor,
        })
    }

    async fn list_releases(
        &self,
        entity_id: &str,
        kind: ReleaseKind,
        page: u32,
        page_size: u32,
    ) -> Result<ReleasePage, CatalogError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.list_releases += 1;

        if let Some(error) = inner.release_errors.get(entity_id) {
            return Err(error.clone());
        }

        let of_kind: Vec<Release> = inner
            .releases
            .get(entity_id)
            .map(|all| all.iter().filter(|r| r.kind == kind).cloned().collect())
            .unwrap_or_default();

        let start = ((page * page_size) as usize).min(of_kind.len());
        let end = (start + page_size as usize).min(of_kind.len());

        Ok(ReleasePage {
            items: of_kind[start..end].to_vec(),
            has_next: end < of_kind.len(),
        })
    }

    async fn list_tracks(&self, release_id: &str, limit: u32) -> Result<Vec<TrackRef>, CatalogError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.list_tracks += 1;

        if let Some(error) = inner.track_errors.get(release_id) {
            return Err(error.clone());
        }

        Ok(inner
            .tracks
            .get(release_id)
            .map(|t| t.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn append_tracks(&self, collection_id: &str, tracks: &[TrackRef]) -> Result<(), CatalogError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.append_tracks += 1;

        if let Some(Err(error)) = inner.append_script.pop_front() {
            return Err(error);
        }

        inner
            .appended
            .push((collection_id.to_string(), tracks.to_vec()));
        Ok(())
    }
}
