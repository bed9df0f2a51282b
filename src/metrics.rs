use metrics::{describe_gauge, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Instant;

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod external;
pub mod http;

pub static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Register the metrics for the application
pub fn register_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Metrics handle already set"))?;

    http::register_metrics();
    external::register_metrics();
    commands::register_metrics();
    dispatch::register_metrics();
    config::register_metrics();

    describe_gauge!(
        "build_info",
        "Build information of the application, labeled by version"
    );
    gauge!("build_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub enum Status {
    Success,
    Failure,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Failure => write!(f, "failure"),
        }
    }
}

/// Records its lifetime into a histogram when dropped
pub struct Timer {
    metric_name: &'static str,
    start_time: Instant,
    labels: Vec<(String, String)>,
}

impl Timer {
    /// Create a new timer
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            metric_name,
            start_time: Instant::now(),
            labels: Vec::new(),
        }
    }

    /// Add a label to the timer
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start_time.elapsed().as_secs_f64();

        if self.labels.is_empty() {
            histogram!(self.metric_name).record(duration);
        } else {
            let labels: Vec<_> = self
                .labels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            histogram!(self.metric_name, &labels).record(duration);
        }
    }
}
