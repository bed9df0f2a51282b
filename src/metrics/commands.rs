use crate::metrics::{Status, Timer};
use metrics::{counter, describe_counter, describe_histogram};

/// Register the metrics for the application
pub(super) fn register_metrics() {
    // Number of diagnostic commands run, labeled with the status (success or failure).
    describe_counter!(
        "command_executions_total",
        "Total number of diagnostic command executions"
    );

    describe_histogram!(
        "command_duration_seconds",
        "Duration of diagnostic command executions in seconds"
    );
}

/// Record the execution of a diagnostic command
pub fn record_command_execution(status: Status) {
    counter!("command_executions_total", "status" => status.to_string()).increment(1);
}

/// Create a timer for a diagnostic command
pub fn command_timer() -> Timer {
    Timer::new("command_duration_seconds")
}
