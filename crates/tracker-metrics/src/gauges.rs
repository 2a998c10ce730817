use metrics::{describe_gauge, gauge};

/// Initialize gauge descriptions
pub fn init() {
    describe_gauge!(
        "tracker_directory_users",
        "Number of addresses in the current directory snapshot"
    );
    describe_gauge!(
        "tracker_retry_queue_depth",
        "Number of notifications waiting for another attempt"
    );
}

/// Set directory size gauge
pub fn set_directory_users(count: usize) {
    gauge!("tracker_directory_users").set(count as f64);
}

/// Set retry queue depth gauge
pub fn set_retry_queue_depth(count: usize) {
    gauge!("tracker_retry_queue_depth").set(count as f64);
}
