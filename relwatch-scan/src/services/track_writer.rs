//! Deduplicating batched playlist writer
//!
//! Collapses repeated track references, splits the rest into chunks no larger
//! than the append limit and issues one append per chunk. Chunks are
//! independent: a failed chunk is recorded and the remaining chunks are still
//! attempted. Only an authorization failure stops the batch, because every
//! following call would fail the same way.
//!
//! Duplicates are removed within one call's input only. The same track
//! written by two separate runs appears twice in the playlist.

use super::{CatalogClient, RateLimitExecutor};
use crate::error::CatalogError;
use crate::models::TrackRef;
use std::collections::HashSet;
use tracing::{debug, warn};

/// A chunk whose append failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFailure {
    /// Chunk index within the batch
    pub index: usize,
    pub tracks: usize,
    pub error: CatalogError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Unique tracks after dedup
    pub unique: usize,
    /// Tracks in chunks that were accepted
    pub appended: usize,
    pub failed_chunks: Vec<ChunkFailure>,
}

impl WriteOutcome {
    /// Every chunk was accepted
    pub fn is_complete(&self) -> bool {
        self.failed_chunks.is_empty()
    }
}

pub struct TrackBatchWriter<'a> {
    client: &'a dyn CatalogClient,
    executor: &'a RateLimitExecutor,
    chunk_size: usize,
}

impl<'a> TrackBatchWriter<'a> {
    pub fn new(client: &'a dyn CatalogClient, executor: &'a RateLimitExecutor, chunk_size: usize) -> Self {
        Self {
            client,
            executor,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Append `tracks` to `collection_id`.
    ///
    /// Returns `Err` only for authorization failures; other chunk failures
    /// are collected in the outcome.
    pub async fn append(
        &self,
        collection_id: &str,
        tracks: &[TrackRef],
    ) -> Result<WriteOutcome, CatalogError> {
        let unique = dedupe(tracks);
        let mut outcome = WriteOutcome {
            unique: unique.len(),
            ..Default::default()
        };

        let client = self.client;
        for (index, chunk) in unique.chunks(self.chunk_size).enumerate() {
            let result = self
                .executor
                .execute("append_tracks", move || client.append_tracks(collection_id, chunk))
                .await;

            match result {
                Ok(()) => {
                    debug!(chunk = index, tracks = chunk.len(), "Appended chunk");
                    outcome.appended += chunk.len();
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(chunk = index, tracks = chunk.len(), error = %e, "Chunk append failed");
                    outcome.failed_chunks.push(ChunkFailure {
                        index,
                        tracks: chunk.len(),
                        error: e,
                    });
                }
            }
        }

        Ok(outcome)
    }
}

/// Drop repeated references, keeping first occurrence order
pub fn dedupe(tracks: &[TrackRef]) -> Vec<TrackRef> {
    let mut seen = HashSet::with_capacity(tracks.len());
    tracks
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(ids: &[&str]) -> Vec<TrackRef> {
        ids.iter().map(|id| TrackRef::new(format!("spotify:track:{id}"))).collect()
    }

    #[test]
    fn test_dedupe_collapses_repeats() {
        let unique = dedupe(&refs(&["a", "b", "a", "c", "b"]));
        assert_eq!(unique, refs(&["a", "b", "c"]));
    }

    #[test]
    fn test_dedupe_empty() {
        assert!(dedupe(&[]).is_empty());
    }

    #[test]
    fn test_outcome_complete_without_failures() {
        let outcome = WriteOutcome {
            unique: 3,
            appended: 3,
            failed_chunks: vec![],
        };
        assert!(outcome.is_complete());
    }
}
