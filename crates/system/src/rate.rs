//! Turning raw counters into plottable samples.
//!
//! Everything here is pure: two readings plus an elapsed time in, a
//! non-negative finite number out.

use std::collections::BTreeMap;
use sysgraph_core::state::{CounterSnapshot, DiskIoCounters, MetricSample};

/// Bytes per megabyte as used on every rate graph.
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Throughput in MB/s between two readings of a cumulative byte counter.
///
/// Returns `0.0` when `elapsed_secs` is not a positive finite number, and when
/// the counter went backwards (device replug, wraparound).
pub fn compute_rate(prev: u64, curr: u64, elapsed_secs: f64) -> MetricSample {
    if !(elapsed_secs.is_finite() && elapsed_secs > 0.0) {
        return 0.0;
    }
    let delta = curr.saturating_sub(prev);
    delta as f64 / elapsed_secs / BYTES_PER_MB
}

/// Gauges are already percentages; only non-finite or out-of-range readings
/// are corrected.
pub fn gauge(value: f64) -> MetricSample {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Seconds between two snapshots, `0.0` if `curr` is not later than `prev`.
pub fn elapsed_secs(prev: &CounterSnapshot, curr: &CounterSnapshot) -> f64 {
    curr.taken_at
        .saturating_duration_since(prev.taken_at)
        .as_secs_f64()
}

/// Summed read/write MB/s over every device in `curr` accepted by `include`.
///
/// A device absent from `prev` is measured against a zero baseline; a device
/// absent from `curr` contributes nothing.
pub fn aggregate_disk_rates(
    prev: &BTreeMap<String, DiskIoCounters>,
    curr: &BTreeMap<String, DiskIoCounters>,
    elapsed_secs: f64,
    include: impl Fn(&str) -> bool,
) -> (MetricSample, MetricSample) {
    curr.iter()
        .filter(|(name, _)| include(name.as_str()))
        .fold((0.0, 0.0), |(read, write), (name, now)| {
            let before = prev.get(name).copied().unwrap_or_default();
            (
                read + compute_rate(before.bytes_read, now.bytes_read, elapsed_secs),
                write + compute_rate(before.bytes_written, now.bytes_written, elapsed_secs),
            )
        })
}

/// Receive/send MB/s for the interface `name`.
///
/// `(0.0, 0.0)` if the interface is missing from `curr`; a zero baseline is
/// used if it is missing from `prev`.
pub fn interface_rates(
    prev: &CounterSnapshot,
    curr: &CounterSnapshot,
    name: &str,
    elapsed_secs: f64,
) -> (MetricSample, MetricSample) {
    let Some(now) = curr.interface(name) else {
        return (0.0, 0.0);
    };
    let (rx, tx) = prev
        .interface(name)
        .map(|i| (i.bytes_received, i.bytes_sent))
        .unwrap_or((0, 0));
    (
        compute_rate(rx, now.bytes_received, elapsed_secs),
        compute_rate(tx, now.bytes_sent, elapsed_secs),
    )
}
