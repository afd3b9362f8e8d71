//! Rate-limit executor
//!
//! Wraps a remote call. When the service answers "rate limited", sleeps for
//! the advertised retry-after plus a safety margin and re-issues the same
//! call in place. Every other outcome goes straight back to the caller; only
//! the rate-limit case is retried.
//!
//! Retried calls must be safe to repeat. Playlist appends are, because the
//! playlist tolerates duplicate entries.

use crate::clock::Clock;
use crate::config::ScanConfig;
use crate::error::CatalogError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub struct RateLimitExecutor {
    clock: Arc<dyn Clock>,
    margin: Duration,
    /// `None`: retry forever
    max_retries: Option<u32>,
}

impl RateLimitExecutor {
    pub fn new(clock: Arc<dyn Clock>, margin: Duration, max_retries: Option<u32>) -> Self {
        Self {
            clock,
            margin,
            max_retries,
        }
    }

    pub fn from_config(clock: Arc<dyn Clock>, config: &ScanConfig) -> Self {
        Self::new(clock, config.rate_limit_margin, config.max_rate_limit_retries)
    }

    /// Run `call` until it returns something other than `RateLimited`.
    ///
    /// With a retry cap configured, the final `RateLimited` error is returned
    /// once the cap is exhausted.
    pub async fn execute<T, F, Fut>(&self, label: &str, mut call: F) -> Result<T, CatalogError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let mut retries: u32 = 0;

        loop {
            match call().await {
                Err(CatalogError::RateLimited { retry_after }) => {
                    if let Some(max) = self.max_retries {
                        if retries >= max {
                            warn!(call = label, retries, "Rate-limit retry cap reached, giving up");
                            return Err(CatalogError::RateLimited { retry_after });
                        }
                    }
                    retries += 1;

                    let wait = retry_after.saturating_add(self.margin);
                    warn!(
                        call = label,
                        retry_after_secs = retry_after.as_secs(),
                        wait_secs = wait.as_secs(),
                        attempt = retries,
                        "Rate limited, sleeping before retry"
                    );
                    self.clock.sleep(wait).await;
                }
                outcome => return outcome,
            }
        }
    }
}
