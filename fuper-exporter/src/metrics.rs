//! Prometheus gauges for the latest snapshot.

use std::sync::Arc;

use fuper_common::Snapshot;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;

use crate::config::MetricsConfig;

/// Content type of the rendered exposition text.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

#[derive(Debug, thiserror::Error)]
#[error("Failed to encode metrics: {0}")]
pub struct MetricsError(#[from] std::fmt::Error);

/// Registry of the exported quota gauges.
///
/// Gauges are registered once in [`StatusMetrics::new`]; publishing only
/// overwrites their values.
pub struct StatusMetrics {
    registry: Registry,
    percentage: Gauge,
    can_transfer: Gauge,
    transfered: Gauge,
    min_speed: Gauge,
    max_speed: Gauge,
    refreshes: Counter,
    refresh_failures: Counter,
    last_refresh: Gauge,
}

/// Shareable metrics handle.
pub type SharedMetrics = Arc<StatusMetrics>;

impl StatusMetrics {
    /// Create and register all series under `<namespace>_<subsystem>`.
    pub fn new(config: &MetricsConfig) -> Self {
        let mut registry = Registry::with_prefix(config.prefix());

        let percentage: Gauge = Gauge::default();
        let can_transfer: Gauge = Gauge::default();
        let transfered: Gauge = Gauge::default();
        let min_speed: Gauge = Gauge::default();
        let max_speed: Gauge = Gauge::default();
        let refreshes: Counter = Counter::default();
        let refresh_failures: Counter = Counter::default();
        let last_refresh: Gauge = Gauge::default();

        registry.register(
            "percentage",
            "Quota utilization in percent",
            percentage.clone(),
        );
        registry.register(
            "can_transfer",
            "Data volume allowed in MB",
            can_transfer.clone(),
        );
        registry.register(
            "transfered",
            "Data volume already transferred in MB",
            transfered.clone(),
        );
        registry.register(
            "min_speed",
            "Guaranteed minimum speed in kb/s",
            min_speed.clone(),
        );
        registry.register(
            "max_speed",
            "Maximum allowed speed in kb/s",
            max_speed.clone(),
        );
        registry.register(
            "refreshes",
            "Successful status page refreshes",
            refreshes.clone(),
        );
        registry.register(
            "refresh_failures",
            "Failed status page refreshes",
            refresh_failures.clone(),
        );
        registry.register(
            "last_refresh_timestamp_seconds",
            "Unix time of the last successful refresh",
            last_refresh.clone(),
        );

        Self {
            registry,
            percentage,
            can_transfer,
            transfered,
            min_speed,
            max_speed,
            refreshes,
            refresh_failures,
            last_refresh,
        }
    }

    /// Overwrite the quota gauges with a snapshot's values.
    pub fn publish(&self, snapshot: &Snapshot) {
        self.percentage.set(snapshot.usage_percent);
        self.can_transfer.set(snapshot.quota_amount);
        self.transfered.set(snapshot.transferred_amount);
        self.min_speed.set(snapshot.min_guaranteed_speed);
        self.max_speed.set(snapshot.max_allowed_speed);
    }

    /// Count a successful refresh completed at `timestamp_ms`.
    pub fn record_refresh(&self, timestamp_ms: i64) {
        self.refreshes.inc();
        self.last_refresh.set(timestamp_ms / 1000);
    }

    /// Count a failed refresh.
    pub fn record_failure(&self) {
        self.refresh_failures.inc();
    }

    /// Render all series in OpenMetrics text format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut output = String::new();
        encode(&mut output, &self.registry)?;
        Ok(output)
    }
}

impl Default for StatusMetrics {
    fn default() -> Self {
        Self::new(&MetricsConfig::default())
    }
}
