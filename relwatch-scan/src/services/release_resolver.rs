//! Release resolution per artist
//!
//! Fetches a bounded window of an artist's albums and singles and ranks them
//! client-side; the catalog does not guarantee date order.
//!
//! # Resolution window
//! Each kind is fetched page by page up to `pages_per_kind` pages. Releases
//! past the window are never seen, so an artist with a very long history may
//! have older releases excluded. This bounds quota and latency per artist.
//!
//! # Tie-break
//! Releases sharing a date keep upstream listing order (albums first, then
//! singles, each in page order); the first one listed wins.

use super::{CatalogClient, RateLimitExecutor};
use crate::config::ReleaseWindow;
use crate::error::CatalogError;
use crate::models::{FollowedEntity, Release, ReleaseKind};
use relwatch_common::ReleaseDate;
use std::collections::HashSet;
use tracing::debug;

pub struct ReleaseResolver<'a> {
    client: &'a dyn CatalogClient,
    executor: &'a RateLimitExecutor,
    window: ReleaseWindow,
}

impl<'a> ReleaseResolver<'a> {
    pub fn new(
        client: &'a dyn CatalogClient,
        executor: &'a RateLimitExecutor,
        window: ReleaseWindow,
    ) -> Self {
        Self {
            client,
            executor,
            window,
        }
    }

    /// Most recent release in the window, if the artist has any
    pub async fn latest_release(
        &self,
        entity: &FollowedEntity,
    ) -> Result<Option<Release>, CatalogError> {
        let releases = self.fetch_window(entity).await?;
        Ok(pick_latest(&releases).cloned())
    }

    /// Releases in the window dated strictly after `threshold`, in listing order
    pub async fn releases_since(
        &self,
        entity: &FollowedEntity,
        threshold: ReleaseDate,
    ) -> Result<Vec<Release>, CatalogError> {
        let releases = self.fetch_window(entity).await?;
        Ok(newer_than(releases, threshold))
    }

    async fn fetch_window(&self, entity: &FollowedEntity) -> Result<Vec<Release>, CatalogError> {
        let client = self.client;
        let entity_id = entity.id.as_str();
        let page_size = self.window.page_size;
        let mut seen = HashSet::new();
        let mut releases = Vec::new();

        for kind in ReleaseKind::SCANNED {
            for page in 0..self.window.pages_per_kind {
                let result = self
                    .executor
                    .execute("list_releases", move || {
                        client.list_releases(entity_id, kind, page, page_size)
                    })
                    .await?;

                debug!(
                    entity = %entity.name,
                    kind = %kind,
                    page,
                    items = result.items.len(),
                    "Fetched release page"
                );

                releases.extend(
                    result
                        .items
                        .into_iter()
                        .filter(|r| seen.insert(r.id.clone())),
                );

                if !result.has_next {
                    break;
                }
            }
        }

        Ok(releases)
    }
}

/// Newest release; on equal dates the earliest listed wins
pub fn pick_latest(releases: &[Release]) -> Option<&Release> {
    releases.iter().fold(None, |best: Option<&Release>, candidate| match best {
        Some(current) if candidate.release_date <= current.release_date => Some(current),
        _ => Some(candidate),
    })
}

/// Keep releases strictly newer than `threshold`, preserving order
pub fn newer_than(releases: Vec<Release>, threshold: ReleaseDate) -> Vec<Release> {
    releases
        .into_iter()
        .filter(|r| r.release_date > threshold)
        .collect()
}
