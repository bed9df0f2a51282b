use crate::metrics::Timer;
use metrics::{counter, describe_counter, describe_histogram};

/// Register the metrics for the application
pub(super) fn register_metrics() {
    // Number of HTTP requests
    describe_counter!(
        "http_requests_total",
        "Total number of HTTP requests per endpoint"
    );

    // Latency of serving HTTP requests per endpoint
    describe_histogram!(
        "http_request_duration_seconds",
        "Duration of HTTP requests in seconds per endpoint"
    );
}

/// Record an HTTP request for a given endpoint
pub fn record_http_request(endpoint: &str) {
    counter!("http_requests_total", "endpoint" => endpoint.to_string()).increment(1);
}

/// Create a timer for an HTTP request to a given endpoint
pub fn http_request_timer(endpoint: &str) -> Timer {
    Timer::new("http_request_duration_seconds").with_label("endpoint", endpoint.to_string())
}
