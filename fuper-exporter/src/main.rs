//! Quota status exporter.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use fuper_common::init_tracing;
use fuper_exporter::{
    ExporterConfig, HttpServer, HttpStatusSource, RefreshScheduler, SnapshotCache, StatusMetrics,
};

/// Scrape the quota status page and serve it as JSON and Prometheus metrics.
#[derive(Parser, Debug)]
#[command(name = "fuper-exporter")]
#[command(about = "Export the fuper quota status page as JSON and Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Status page URL (overrides config).
    #[arg(long)]
    url: Option<String>,

    /// Log level (trace, debug, info, warn, error; overrides config).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    // Apply CLI overrides
    if let Some(listen) = args.listen {
        config.http.listen = listen;
    }
    if let Some(url) = args.url {
        config.source.url = url;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        url = %config.source.url,
        listen = %config.http.listen,
        "Starting fuper exporter"
    );

    let metrics = Arc::new(StatusMetrics::new(&config.metrics));
    let cache = Arc::new(SnapshotCache::new());

    let source = HttpStatusSource::new(&config.source)?;
    let scheduler = RefreshScheduler::new(
        source,
        metrics.clone(),
        cache.clone(),
        config.source.refresh_interval(),
    );

    let listen_addr = config
        .http
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;
    let http_server = HttpServer::new(
        cache.clone(),
        metrics.clone(),
        listen_addr,
        config.http.metrics_path.clone(),
    );
    let listener = http_server.bind().await?;

    // Initial refresh before serving; a failure leaves the zero snapshot
    let _ = scheduler.refresh_once().await;

    let scheduler_task = tokio::spawn(scheduler.run());
    let mut http_task = tokio::spawn(http_server.serve(listener));

    tokio::select! {
        signal = shutdown_signal() => {
            info!(signal, "Received shutdown signal, exiting");
        }
        result = &mut http_task => {
            scheduler_task.abort();
            match result {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(e)) => {
                    error!(error = %e, "HTTP server failed");
                    return Err(e);
                }
                Err(e) => return Err(anyhow::anyhow!("HTTP server task panicked: {}", e)),
            }
        }
    }

    // An in-flight refresh is abandoned, not awaited
    std::process::exit(0);
}

/// Resolve with the name of the first termination signal received.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
