use metrics::{counter, describe_counter};

/// Initialize counter descriptions
pub fn init() {
    describe_counter!("tracker_cycles_total", "Total number of poll cycles run");
    describe_counter!(
        "tracker_blocks_processed_total",
        "Total number of new tip blocks fetched and scanned"
    );
    describe_counter!(
        "tracker_reward_matches_total",
        "Total number of outputs credited to a known address"
    );
    describe_counter!(
        "tracker_notifications_sent_total",
        "Total number of notifications delivered"
    );
    describe_counter!(
        "tracker_notifications_failed_total",
        "Total number of failed notification attempts"
    );
    describe_counter!(
        "tracker_notifications_dropped_total",
        "Total number of notifications given up on"
    );
    describe_counter!(
        "tracker_directory_refreshes_total",
        "Total number of completed directory reloads"
    );
    describe_counter!("tracker_errors_total", "Total number of errors");
}

/// Increment cycle counter
pub fn cycles(count: u64) {
    counter!("tracker_cycles_total").increment(count);
}

/// Increment blocks processed counter
pub fn blocks_processed(count: u64) {
    counter!("tracker_blocks_processed_total").increment(count);
}

/// Increment reward matches counter
pub fn reward_matches(count: u64) {
    counter!("tracker_reward_matches_total").increment(count);
}

/// Increment delivered notifications counter
pub fn notifications_sent(count: u64) {
    counter!("tracker_notifications_sent_total").increment(count);
}

/// Increment failed notification attempts counter
pub fn notifications_failed(count: u64) {
    counter!("tracker_notifications_failed_total").increment(count);
}

/// Increment dropped notifications counter
pub fn notifications_dropped(count: u64) {
    counter!("tracker_notifications_dropped_total").increment(count);
}

/// Increment directory refresh counter
pub fn directory_refreshes(count: u64) {
    counter!("tracker_directory_refreshes_total").increment(count);
}

/// Increment errors counter
pub fn errors(count: u64, error_type: &str) {
    counter!("tracker_errors_total", "type" => error_type.to_string()).increment(count);
}
