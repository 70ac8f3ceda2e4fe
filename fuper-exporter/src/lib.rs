//! Quota status exporter.
//!
//! This crate scrapes a network operator's quota status page on a fixed
//! interval and re-exposes the latest result as a JSON document and as
//! Prometheus gauges.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   Status page   │────>│    Scheduler    │────>│  SnapshotCache  │──> GET /
//! │  (HTML table)   │     │ (fetch + parse) │     └─────────────────┘
//! └─────────────────┘     └─────────────────┘     ┌─────────────────┐
//!                                  └─────────────>│  StatusMetrics  │──> GET /metrics
//!                                                 └─────────────────┘
//! ```
//!
//! A failed refresh is logged and the previous snapshot keeps being served.
//!
//! # Usage
//!
//! ```bash
//! fuper-exporter --config config.json5
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options. Without a
//! configuration file the exporter polls `http://212.27.205.129/` every ten
//! minutes and listens on port 5050.

pub mod cache;
pub mod config;
pub mod fetcher;
pub mod http;
pub mod metrics;
pub mod parser;
pub mod scheduler;

pub use cache::{CachedSnapshot, SharedCache, SnapshotCache};
pub use config::ExporterConfig;
pub use fetcher::{FetchError, HttpStatusSource, StatusSource};
pub use http::HttpServer;
pub use metrics::{SharedMetrics, StatusMetrics};
pub use scheduler::{RefreshError, RefreshScheduler};
