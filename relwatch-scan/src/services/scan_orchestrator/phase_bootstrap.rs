//! BOOTSTRAPPING phase: one track per artist

use super::ScanOrchestrator;
use crate::error::{CatalogError, ScanError};
use crate::models::{FollowedEntity, RunReport, ScanState};
use tracing::{debug, info};

impl ScanOrchestrator {
    /// Walk artists from `bootstrap_cursor`, adding the first track of each
    /// artist's latest release, then switch to MONITORING.
    pub(super) async fn phase_bootstrap(
        &self,
        state: &mut ScanState,
        entities: &[FollowedEntity],
        report: &mut RunReport,
    ) -> Result<(), ScanError> {
        let start = state.bootstrap_cursor;
        if start > 0 {
            info!(cursor = start, total = entities.len(), "Resuming bootstrap");
        }

        for (index, entity) in entities.iter().enumerate().skip(start) {
            debug!(position = index + 1, total = entities.len(), entity = %entity.name, "Bootstrapping artist");

            match self.bootstrap_entity(state, entity, report).await {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(ScanError::from_catalog(e)),
                Err(e) => report.skip(&entity.name, None, e.to_string()),
            }

            report.entities_visited += 1;
            state.bootstrap_cursor = index + 1;
            self.persist(state)?;
            self.throttle().await;
        }

        state.complete_bootstrap(self.clock.now());
        self.persist(state)?;
        info!(
            artists = entities.len(),
            watermark = %state.global_watermark_date,
            "Bootstrap complete, switching to monitoring"
        );
        Ok(())
    }

    async fn bootstrap_entity(
        &self,
        state: &mut ScanState,
        entity: &FollowedEntity,
        report: &mut RunReport,
    ) -> Result<(), CatalogError> {
        let Some(release) = self.resolver().latest_release(entity).await? else {
            debug!(entity = %entity.name, "No releases");
            return Ok(());
        };

        let tracks = self.fetch_tracks(&release, 1).await?;
        let Some(first) = tracks.into_iter().next() else {
            debug!(entity = %entity.name, release = %release.name, "Latest release has no tracks");
            return Ok(());
        };

        let appended = self.write_tracks(std::slice::from_ref(&first)).await?;

        state.record_release(&entity.id, release.release_date);
        report.releases_added += 1;
        report.tracks_appended += appended;

        info!(
            entity = %entity.name,
            release = %release.name,
            release_date = %release.release_date,
            track = %first,
            "Seeded track"
        );
        Ok(())
    }
}
