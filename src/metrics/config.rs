use crate::{config::Config, metrics::Status};
use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Register the metrics for the application
pub(super) fn register_metrics() {
    describe_counter!(
        "config_loads_total",
        "Config file loads and reloads, labeled by status"
    );

    describe_gauge!(
        "config_last_load_timestamp_seconds",
        "Time of the last successful config load in seconds since the Unix epoch"
    );

    describe_gauge!(
        "config_alerts",
        "Number of alert names with diagnostic commands configured"
    );

    describe_gauge!(
        "config_commands",
        "Number of diagnostic commands configured across all alerts"
    );

    describe_gauge!("config_host_aliases", "Number of configured host aliases");
}

/// Record an attempt to load the config file
pub fn record_config_load(status: Status) {
    counter!("config_loads_total", "status" => status.to_string()).increment(1);
}

/// Record the shape of the config now being served
pub fn record_config_served(config: &Config) {
    let commands: usize = config.alerts.values().map(Vec::len).sum();
    let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;

    gauge!("config_alerts").set(config.alerts.len() as f64);
    gauge!("config_commands").set(commands as f64);
    gauge!("config_host_aliases").set(config.hosts.len() as f64);
    gauge!("config_last_load_timestamp_seconds").set(now);
}
