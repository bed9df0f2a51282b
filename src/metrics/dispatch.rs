use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Register the metrics for the application
pub(super) fn register_metrics() {
    // Count of alerts received on the webhook, labeled with the alert status.
    describe_counter!("alerts_received_total", "Total number of alerts received");

    // Count of finished dispatch units, labeled with the outcome.
    describe_counter!(
        "dispatch_units_total",
        "Total number of firing alerts processed"
    );

    // Timestamp of the last completed dispatch
    describe_gauge!(
        "last_dispatch_timestamp",
        "Timestamp of the last completed alert batch dispatch"
    );
}

/// Record an alert received on the webhook
pub fn record_alert_received(status: &str) {
    counter!("alerts_received_total", "status" => status.to_string()).increment(1);
}

/// Record the outcome of one dispatch unit
pub fn record_dispatch_unit(outcome: &'static str) {
    counter!("dispatch_units_total", "outcome" => outcome).increment(1);
}

/// Record the timestamp of the last completed dispatch
pub fn record_dispatch_completed() {
    let timestamp = chrono::Utc::now().timestamp() as f64;

    gauge!("last_dispatch_timestamp").set(timestamp);
}
