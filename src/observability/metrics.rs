//! Metrics collection.
//!
//! # Metrics
//! - `gateway_rpc_requests_total` (counter): node calls by method, outcome
//! - `gateway_poll_attempts_total` (counter): polling attempts by flow
//! - `gateway_poll_outcomes_total` (counter): finished polls by flow, outcome
//! - `gateway_sweeps_total` (counter): sweeps by coin, outcome

use metrics::counter;

/// Record one node call.
pub fn record_rpc(method: &str, outcome: &'static str) {
    counter!(
        "gateway_rpc_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record one attempt of a polling loop.
pub fn record_poll_attempt(flow: &'static str) {
    counter!("gateway_poll_attempts_total", "flow" => flow).increment(1);
}

/// Record how a polling loop ended.
pub fn record_poll_outcome(flow: &'static str, outcome: &'static str) {
    counter!("gateway_poll_outcomes_total", "flow" => flow, "outcome" => outcome).increment(1);
}

/// Record a finished sweep.
pub fn record_sweep(coin: &'static str, outcome: &'static str) {
    counter!("gateway_sweeps_total", "coin" => coin, "outcome" => outcome).increment(1);
}
