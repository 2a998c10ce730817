use metrics::{describe_histogram, histogram};
use std::time::Duration;

/// Initialize histogram descriptions
pub fn init() {
    describe_histogram!(
        "tracker_node_query_duration_seconds",
        "Time for node-control queries"
    );
    describe_histogram!(
        "tracker_cycle_duration_seconds",
        "Time for a poll cycle that fetched a block"
    );
    describe_histogram!(
        "tracker_dispatch_duration_seconds",
        "Time for a single notification attempt"
    );
}

/// Record node query duration
pub fn node_query_duration(duration: Duration, operation: &str) {
    histogram!("tracker_node_query_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}

/// Record cycle duration
pub fn cycle_duration(duration: Duration) {
    histogram!("tracker_cycle_duration_seconds").record(duration.as_secs_f64());
}

/// Record dispatch duration
pub fn dispatch_duration(duration: Duration) {
    histogram!("tracker_dispatch_duration_seconds").record(duration.as_secs_f64());
}
