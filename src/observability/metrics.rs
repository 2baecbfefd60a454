//! Middleware metrics.
//!
//! # Metrics
//! - `speedtracer_traces_captured_total` (counter): traces persisted
//! - `speedtracer_lookups_total` (counter): retrieval requests by `outcome` (hit, miss)
//! - `speedtracer_store_errors_total` (counter): failed store calls by `op` (get, set)

use metrics::counter;

pub fn record_capture() {
    counter!("speedtracer_traces_captured_total").increment(1);
}

pub fn record_lookup(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("speedtracer_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_store_error(op: &'static str) {
    counter!("speedtracer_store_errors_total", "op" => op).increment(1);
}
