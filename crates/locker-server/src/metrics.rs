// Metric descriptions for the lock service
// The recorder is installed by whoever embeds the server; without one the
// counters are no-ops.

use metrics::{counter, describe_counter};

/// Describe every metric emitted by the service. Call once at startup.
pub fn init_metrics() {
    describe_counter!(
        "locker_operations_total",
        "Lock operations by operation and outcome"
    );
    describe_counter!(
        "locker_command_rejections_total",
        "Slash-command requests rejected before reaching the lock engine"
    );
}

/// Count a request refused by token or command verification
pub fn record_rejection(command: &'static str, reason: &'static str) {
    counter!("locker_command_rejections_total", "command" => command, "reason" => reason)
        .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_without_recorder() {
        // Must not panic when no recorder is installed
        init_metrics();
        record_rejection("lock", "token");
    }
}
