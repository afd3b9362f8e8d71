//! Service modules for the catalog scan
//!
//! Leaves first:
//! - `catalog_client`: remote catalog seam (trait) and its Spotify implementation
//! - `checkpoint_store`: durable scan state
//! - `rate_limit`: backoff-and-retry executor
//! - `entity_lister`, `release_resolver`, `track_writer`: per-step logic
//! - `scan_orchestrator`: the two-phase state machine
//! - `scheduler`: daily trigger times

pub mod catalog_client;
pub mod checkpoint_store;
pub mod entity_lister;
pub mod rate_limit;
pub mod release_resolver;
pub mod scan_orchestrator;
pub mod scheduler;
pub mod spotify_client;
pub mod track_writer;

pub use catalog_client::CatalogClient;
pub use checkpoint_store::CheckpointStore;
pub use entity_lister::EntityLister;
pub use rate_limit::RateLimitExecutor;
pub use release_resolver::ReleaseResolver;
pub use scan_orchestrator::ScanOrchestrator;
pub use scheduler::DailySchedule;
pub use spotify_client::{AccessCheck, SpotifyClient};
pub use track_writer::{ChunkFailure, TrackBatchWriter, WriteOutcome};
