//! Error types for relwatch-scan
//!
//! Two layers:
//! - [`CatalogError`]: outcome of a single remote call
//! - [`ScanError`]: conditions that abort a whole scan run

use std::time::Duration;
use thiserror::Error;

/// Remote catalog call error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Service asked us to back off (HTTP 429)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Timeouts, connection failures, 5xx
    #[error("Transient remote error: {0}")]
    Transient(String),

    /// Token expired, revoked or lacking scope (401/403)
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Any other non-success status
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CatalogError {
    /// Errors that must abort the run instead of skipping one unit
    pub fn is_fatal(&self) -> bool {
        matches!(self, CatalogError::Authorization(_))
    }
}

/// Run-level failure; the checkpoint keeps the last confirmed progress
#[derive(Debug, Error)]
pub enum ScanError {
    /// The followed-artist list could not be obtained
    #[error("Cannot list followed artists: {0}")]
    Listing(#[source] CatalogError),

    /// Authorization failed mid-run
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// Checkpoint could not be persisted
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] relwatch_common::Error),
}

impl ScanError {
    /// Map a catalog error that ends the run to a run error
    pub(crate) fn from_catalog(err: CatalogError) -> Self {
        match err {
            CatalogError::Authorization(msg) => ScanError::Authorization(msg),
            other => ScanError::Listing(other),
        }
    }
}
