//! Remote catalog seam
//!
//! Everything the scan needs from the music service. Any call may fail with
//! [`CatalogError::RateLimited`]; callers route calls through
//! [`RateLimitExecutor`](super::RateLimitExecutor) to absorb those.

use crate::error::CatalogError;
use crate::models::{EntityPage, ReleaseKind, ReleasePage, TrackRef};
use async_trait::async_trait;

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// One page of followed artists, starting after `cursor`
    async fn list_followed(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<EntityPage, CatalogError>;

    /// Page `page` (0-based) of an artist's releases of one kind
    async fn list_releases(
        &self,
        entity_id: &str,
        kind: ReleaseKind,
        page: u32,
        page_size: u32,
    ) -> Result<ReleasePage, CatalogError>;

    /// Up to `limit` tracks of a release, in tracklist order
    async fn list_tracks(&self, release_id: &str, limit: u32)
        -> Result<Vec<TrackRef>, CatalogError>;

    /// Append one chunk of tracks to a playlist
    async fn append_tracks(
        &self,
        collection_id: &str,
        tracks: &[TrackRef],
    ) -> Result<(), CatalogError>;
}
