//! Prometheus instrumentation for the tracker.

pub mod config;
pub mod counters;
pub mod gauges;
pub mod histograms;
pub mod server;

pub use config::MetricsConfig;
pub use server::{MetricsServer, Readiness};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// How often buffered histogram samples are folded into their summaries
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("invalid metrics address: {0}")]
    InvalidAddress(String),

    #[error("cannot bind metrics endpoint: {0}")]
    Bind(#[source] std::io::Error),

    #[error("metrics endpoint stopped: {0}")]
    Serve(#[source] std::io::Error),

    #[error("recorder already installed: {0}")]
    Recorder(String),
}

pub type Result<T> = std::result::Result<T, MetricsError>;

/// Install the global Prometheus recorder and describe all metrics.
///
/// Until this runs, every recording call in the workspace is a no-op. The
/// returned handle needs [`spawn_upkeep`] or histogram samples accumulate
/// between scrapes.
pub fn init() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::Recorder(e.to_string()))?;

    counters::init();
    gauges::init();
    histograms::init();

    Ok(handle)
}

/// Periodically drain histogram buckets so memory stays bounded whether or
/// not `/metrics` is ever scraped.
pub fn spawn_upkeep(handle: PrometheusHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            handle.run_upkeep();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upkeep_keeps_running_and_preserves_samples() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            for _ in 0..100 {
                metrics::histogram!("upkeep_test_seconds").record(0.01);
            }
        });

        let task = spawn_upkeep(handle.clone(), Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!task.is_finished());
        task.abort();

        let rendered = handle.render();
        assert!(rendered.contains("upkeep_test_seconds_count 100"));
    }
}
