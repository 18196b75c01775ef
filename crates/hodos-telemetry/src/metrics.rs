//! Request and error metrics.
//!
//! Metrics are emitted through the `metrics` facade; installing a recorder
//! (Prometheus, statsd, ...) is left to the application.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `hodos_requests_total` | Counter | `method`, `status` |
//! | `hodos_request_duration_seconds` | Histogram | `method` |
//! | `hodos_errors_total` | Counter | `status` |

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Total requests handled.
pub const REQUESTS_TOTAL: &str = "hodos_requests_total";

/// Request latency.
pub const REQUEST_DURATION_SECONDS: &str = "hodos_request_duration_seconds";

/// Errors rendered by the error envelope.
pub const ERRORS_TOTAL: &str = "hodos_errors_total";

/// Registers metric descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, Unit::Count, "Total number of requests handled");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "Request duration from dispatch to response"
    );
    describe_counter!(ERRORS_TOTAL, Unit::Count, "Errors rendered as error envelopes");
}

/// Records one completed request.
pub fn record_request(method: &str, status: u16, duration: Duration) {
    counter!(REQUESTS_TOTAL, "method" => method.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!(REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(duration.as_secs_f64());
}

/// Records one error rendered as an error envelope.
pub fn record_error(status: u16) {
    counter!(ERRORS_TOTAL, "status" => status.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_a_no_op() {
        describe_metrics();
        record_request("GET", 200, Duration::from_millis(3));
        record_error(422);
    }
}
