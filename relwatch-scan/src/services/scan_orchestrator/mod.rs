//! Scan orchestrator
//!
//! Two-phase state machine over the followed-artist list.
//!
//! # Phase Progression
//! BOOTSTRAPPING → MONITORING
//!
//! - **BOOTSTRAPPING** (`phase_bootstrap`): one track from each artist's
//!   latest release, to seed the playlist
//! - **MONITORING** (`phase_monitoring`): once per day, every track of every
//!   release newer than the artist's watermark
//!
//! # Due gate
//! A run does nothing when today's monitoring pass already completed
//! (last run today, MONITORING, monitor cursor 0). Anything else runs, and a
//! nonzero monitor cursor always resumes the interrupted pass.
//!
//! # Checkpointing
//! The checkpoint is saved after every artist and, while monitoring, after
//! every release. Nothing is saved before the first unit of progress, so a
//! run that fails early leaves the checkpoint exactly as it found it.
//! `last_run_timestamp` only moves when a pass completes; an interrupted
//! pass is recognized by `pass_started_at` and resumed the same day.
//!
//! # Errors
//! - Listing failure or authorization failure: the run aborts
//! - Anything else on one artist/release: logged, reported, skipped; the
//!   watermark is not advanced so a later pass retries it

use super::{
    CatalogClient, CheckpointStore, EntityLister, RateLimitExecutor, ReleaseResolver,
    TrackBatchWriter,
};
use crate::clock::Clock;
use crate::config::ScanConfig;
use crate::error::{CatalogError, ScanError};
use crate::models::{Release, RunOutcome, RunReport, ScanPhase, ScanState, TrackRef};
use std::sync::Arc;
use tracing::{debug, info};

mod phase_bootstrap;
mod phase_monitoring;

/// Track limit requested when the catalog does not report a track count
const FALLBACK_TRACK_LIMIT: u32 = 200;

pub struct ScanOrchestrator {
    client: Arc<dyn CatalogClient>,
    clock: Arc<dyn Clock>,
    config: ScanConfig,
    store: CheckpointStore,
    executor: RateLimitExecutor,
}

impl ScanOrchestrator {
    pub fn new(client: Arc<dyn CatalogClient>, clock: Arc<dyn Clock>, config: ScanConfig) -> Self {
        let store = CheckpointStore::new(config.checkpoint_path.clone());
        let executor = RateLimitExecutor::from_config(clock.clone(), &config);

        Self {
            client,
            clock,
            config,
            store,
            executor,
        }
    }

    /// Execute one scheduled invocation.
    ///
    /// Not reentrant: the caller must not start a second run while one is
    /// in flight, since both would own the checkpoint file.
    pub async fn run(&self) -> Result<RunReport, ScanError> {
        let mut state = self.store.load();
        let now = self.clock.now();

        if !state.is_due(now) {
            info!("Today's monitoring pass already complete, nothing to do");
            return Ok(RunReport::new(RunOutcome::NotDue, state.phase));
        }

        let entities = EntityLister::new(
            self.client.as_ref(),
            &self.executor,
            self.config.entity_page_size,
        )
        .list_followed()
        .await
        .map_err(ScanError::from_catalog)?;

        if state.phase == ScanPhase::Monitoring {
            if state.has_stale_cursor(now) {
                info!(
                    stale_cursor = state.monitor_cursor,
                    "New day, restarting monitoring pass from the first artist"
                );
            }
            // Persisted together with the first unit of progress
            state.begin_monitoring_pass(now);
        }

        let mut report = RunReport::new(RunOutcome::Completed, state.phase);
        report.entities_total = entities.len();

        info!(phase = ?state.phase, artists = entities.len(), "Scan started");

        match state.phase {
            ScanPhase::Bootstrapping => {
                self.phase_bootstrap(&mut state, &entities, &mut report).await?
            }
            ScanPhase::Monitoring => {
                self.phase_monitoring(&mut state, &entities, &mut report).await?
            }
        }

        info!(
            visited = report.entities_visited,
            releases = report.releases_added,
            tracks = report.tracks_appended,
            skipped = report.skipped.len(),
            watermark = %state.global_watermark_date,
            "Scan finished"
        );
        Ok(report)
    }

    fn resolver(&self) -> ReleaseResolver<'_> {
        ReleaseResolver::new(self.client.as_ref(), &self.executor, self.config.release_window)
    }

    fn writer(&self) -> TrackBatchWriter<'_> {
        TrackBatchWriter::new(self.client.as_ref(), &self.executor, self.config.chunk_size)
    }

    async fn fetch_tracks(&self, release: &Release, limit: u32) -> Result<Vec<TrackRef>, CatalogError> {
        let client = self.client.as_ref();
        let release_id = release.id.as_str();
        self.executor
            .execute("list_tracks", move || client.list_tracks(release_id, limit))
            .await
    }

    /// Write tracks, turning the first failed chunk into an error
    async fn write_tracks(&self, tracks: &[TrackRef]) -> Result<usize, CatalogError> {
        let outcome = self.writer().append(&self.config.playlist_id, tracks).await?;
        match outcome.failed_chunks.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(outcome.appended),
        }
    }

    fn persist(&self, state: &ScanState) -> Result<(), ScanError> {
        self.store.save(state)?;
        Ok(())
    }

    /// Inter-request delay that keeps the run under the request budget
    async fn throttle(&self) {
        if !self.config.throttle.is_zero() {
            debug!(delay_ms = self.config.throttle.as_millis() as u64, "Throttling");
            self.clock.sleep(self.config.throttle).await;
        }
    }
}

fn track_limit(release: &Release) -> u32 {
    if release.track_count == 0 {
        FALLBACK_TRACK_LIMIT
    } else {
        release.track_count
    }
}
