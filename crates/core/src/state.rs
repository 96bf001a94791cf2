use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// A value plotted on one of the graphs: a percentage in `[0, 100]` or a
/// non-negative rate in MB/s.
pub type MetricSample = f64;

/// Raw cumulative readings taken from the OS at a single point in time.
///
/// Percentages are gauges and are stored as read; byte counts are counters
/// and only become meaningful as a delta between two snapshots.
#[derive(Debug, Clone)]
pub struct CounterSnapshot {
    /// Monotonic capture time, used for elapsed-time computation.
    pub taken_at: Instant,
    /// Wall-clock capture time, for display only.
    pub captured_at: DateTime<Local>,
    /// Aggregate CPU busy percentage (0.0 – 100.0).
    pub cpu_percent: f64,
    /// RAM used in bytes.
    pub memory_used: u64,
    /// Total RAM in bytes.
    pub memory_total: u64,
    /// Used percentage of the configured root filesystem.
    pub disk_percent: f64,
    /// Network interfaces in OS index order.
    pub interfaces: Vec<InterfaceCounters>,
    /// `false` when the interface list could not be read this time; the
    /// counters are then meaningless and must not be used as a baseline.
    pub interfaces_ok: bool,
    /// Whole-disk I/O counters keyed by device name (e.g. `"sda"`).
    pub disks: BTreeMap<String, DiskIoCounters>,
    /// `false` when the disk I/O counters could not be read.
    pub disks_ok: bool,
    /// Mounted partitions with their space usage.
    pub partitions: Vec<PartitionUsage>,
}

impl CounterSnapshot {
    /// An all-zero snapshot stamped with the current time.
    pub fn empty() -> Self {
        Self {
            taken_at: Instant::now(),
            captured_at: Local::now(),
            cpu_percent: 0.0,
            memory_used: 0,
            memory_total: 0,
            disk_percent: 0.0,
            interfaces: Vec::new(),
            interfaces_ok: true,
            disks: BTreeMap::new(),
            disks_ok: true,
            partitions: Vec::new(),
        }
    }

    /// RAM usage as a percentage in `[0, 100]`.
    #[must_use]
    pub fn memory_percent(&self) -> f64 {
        if self.memory_total == 0 {
            return 0.0;
        }
        self.memory_used as f64 / self.memory_total as f64 * 100.0
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceCounters> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

/// Cumulative byte counters and flags for one network interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub name: String,
    /// OS interface index; interfaces are ordered by it.
    pub index: u32,
    pub is_up: bool,
    pub is_loopback: bool,
    /// Whether at least one IP address is assigned.
    pub has_address: bool,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// Cumulative bytes read and written by one block device since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskIoCounters {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Space usage of a mounted partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionUsage {
    pub device: String,
    pub mount_point: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
}

/// Static facts about the machine, captured once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub cpu_model: String,
    pub logical_cores: usize,
    pub physical_cores: Option<usize>,
    pub memory_total: u64,
}

/// Rolling-buffer contents for every plotted metric, oldest sample first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub cpu: Vec<MetricSample>,
    pub memory: Vec<MetricSample>,
    pub disk_read: Vec<MetricSample>,
    pub disk_write: Vec<MetricSample>,
    pub net_read: Vec<MetricSample>,
    pub net_write: Vec<MetricSample>,
}

/// Everything a renderer needs to redraw, produced once per tick.
///
/// Frames are owned copies; the sampler never shares its live buffers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsFrame {
    /// Sequence number of the tick that produced this frame (starts at 1).
    pub tick: u64,
    pub captured_at: DateTime<Local>,
    pub cpu_percent: MetricSample,
    pub memory_percent: MetricSample,
    pub disk_percent: MetricSample,
    /// Interface the network rates were measured on, if any qualified.
    pub active_interface: Option<String>,
    pub history: HistorySnapshot,
    pub partitions: Vec<PartitionUsage>,
    pub host: HostInfo,
}

impl MetricsFrame {
    /// Most recent value of a history series, `0.0` when empty.
    pub fn latest(series: &[MetricSample]) -> MetricSample {
        series.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_percent_of_empty_snapshot_is_zero() {
        assert_eq!(CounterSnapshot::empty().memory_percent(), 0.0);
    }

    #[test]
    fn memory_percent_from_bytes() {
        let snapshot = CounterSnapshot {
            memory_used: 4 << 30,
            memory_total: 16 << 30,
            ..CounterSnapshot::empty()
        };
        assert_eq!(snapshot.memory_percent(), 25.0);
    }

    #[test]
    fn interface_lookup_by_name() {
        let snapshot = CounterSnapshot {
            interfaces: vec![InterfaceCounters {
                name: "eth0".into(),
                bytes_received: 7,
                ..Default::default()
            }],
            ..CounterSnapshot::empty()
        };
        assert_eq!(snapshot.interface("eth0").map(|i| i.bytes_received), Some(7));
        assert!(snapshot.interface("wlan0").is_none());
    }

    #[test]
    fn latest_of_empty_series_is_zero() {
        assert_eq!(MetricsFrame::latest(&[]), 0.0);
        assert_eq!(MetricsFrame::latest(&[1.0, 2.5]), 2.5);
    }
}
