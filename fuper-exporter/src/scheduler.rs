//! Periodic refresh of the cached snapshot.

use std::time::Duration;

use fuper_common::current_timestamp_millis;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::cache::SharedCache;
use crate::fetcher::{FetchError, StatusSource};
use crate::metrics::SharedMetrics;

/// Error type for a refresh cycle.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] fuper_common::Error),
}

/// Drives fetch, publish and cache store on a fixed interval.
pub struct RefreshScheduler<S> {
    source: S,
    metrics: SharedMetrics,
    cache: SharedCache,
    interval: Duration,
}

impl<S: StatusSource> RefreshScheduler<S> {
    pub fn new(source: S, metrics: SharedMetrics, cache: SharedCache, interval: Duration) -> Self {
        Self {
            source,
            metrics,
            cache,
            interval,
        }
    }

    /// Perform a single refresh cycle.
    ///
    /// On failure the gauges and the cached snapshot are left untouched.
    /// Returns the new cache generation.
    pub async fn refresh_once(&self) -> Result<u64, RefreshError> {
        let result = self.try_refresh().await;

        if let Err(e) = &result {
            self.metrics.record_failure();
            error!(error = %e, "Status refresh failed, keeping previous snapshot");
        }

        result
    }

    async fn try_refresh(&self) -> Result<u64, RefreshError> {
        let snapshot = self.source.fetch().await?;
        let body = snapshot.to_json()?;
        let fetched_at = current_timestamp_millis();

        self.metrics.publish(&snapshot);
        self.metrics.record_refresh(fetched_at);
        let generation = self.cache.store(body, fetched_at);

        info!(
            generation,
            address = %snapshot.address,
            percent = snapshot.usage_percent,
            transfered = snapshot.transferred_amount,
            quota = snapshot.quota_amount,
            "Status data loaded"
        );

        Ok(generation)
    }

    /// Run the refresh loop forever.
    ///
    /// The first refresh happens one interval after the call; the startup
    /// refresh is expected to have been done with [`Self::refresh_once`].
    pub async fn run(self) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting refresh scheduler"
        );

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            // Errors are logged inside; the loop keeps going
            let _ = self.refresh_once().await;
        }
    }
}
