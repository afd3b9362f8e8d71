//! MONITORING phase: every release newer than the watermark
//!
//! Qualifying releases of an artist are applied oldest first (listing order
//! among equal dates) rather than in listing order, with a checkpoint after
//! each. The artist's watermark is raised to a date only once every
//! qualifying release with that date has been written, so it never passes an
//! unwritten release: a crash or a failed release leaves that date open and a
//! later pass retries it. Releases already written on an open date may be
//! appended again then (at-least-once).

use super::{track_limit, ScanOrchestrator};
use crate::error::{CatalogError, ScanError};
use crate::models::{FollowedEntity, Release, RunReport, ScanState};
use tracing::{debug, info};

impl ScanOrchestrator {
    /// Walk artists from `monitor_cursor` and ingest their new releases
    pub(super) async fn phase_monitoring(
        &self,
        state: &mut ScanState,
        entities: &[FollowedEntity],
        report: &mut RunReport,
    ) -> Result<(), ScanError> {
        let start = state.monitor_cursor;
        if start > 0 {
            info!(cursor = start, total = entities.len(), "Resuming monitoring pass");
        }

        for (index, entity) in entities.iter().enumerate().skip(start) {
            debug!(position = index + 1, total = entities.len(), entity = %entity.name, "Checking artist");

            self.monitor_entity(state, entity, report).await?;

            report.entities_visited += 1;
            state.monitor_cursor = index + 1;
            self.persist(state)?;
            self.throttle().await;
        }

        state.complete_monitoring_pass(self.clock.now());
        self.persist(state)?;
        Ok(())
    }

    async fn monitor_entity(
        &self,
        state: &mut ScanState,
        entity: &FollowedEntity,
        report: &mut RunReport,
    ) -> Result<(), ScanError> {
        let threshold = state.threshold_for(&entity.id);

        let mut releases = match self.resolver().releases_since(entity, threshold).await {
            Ok(releases) => releases,
            Err(e) if e.is_fatal() => return Err(ScanError::from_catalog(e)),
            Err(e) => {
                report.skip(&entity.name, None, e.to_string());
                return Ok(());
            }
        };

        if releases.is_empty() {
            return Ok(());
        }

        // Stable: equal dates keep listing order
        releases.sort_by_key(|r| r.release_date);

        for (index, release) in releases.iter().enumerate() {
            match self.ingest_release(release).await {
                Ok(appended) => {
                    let closes_date = releases
                        .get(index + 1)
                        .map_or(true, |next| next.release_date != release.release_date);
                    if closes_date {
                        state.record_release(&entity.id, release.release_date);
                    }
                    report.releases_added += 1;
                    report.tracks_appended += appended;
                    self.persist(state)?;

                    info!(
                        entity = %entity.name,
                        release = %release.name,
                        kind = %release.kind,
                        release_date = %release.release_date,
                        tracks = appended,
                        "New release added"
                    );
                }
                Err(e) if e.is_fatal() => return Err(ScanError::from_catalog(e)),
                Err(e) => {
                    // Stop here so the watermark stays below this release
                    report.skip(&entity.name, Some(&release.name), e.to_string());
                    break;
                }
            }
            self.throttle().await;
        }

        Ok(())
    }

    /// Fetch a release's full tracklist and append it; returns tracks appended
    async fn ingest_release(&self, release: &Release) -> Result<usize, CatalogError> {
        let tracks = self.fetch_tracks(release, track_limit(release)).await?;
        if tracks.is_empty() {
            debug!(release = %release.name, "Release has no tracks");
            return Ok(0);
        }
        self.write_tracks(&tracks).await
    }
}
