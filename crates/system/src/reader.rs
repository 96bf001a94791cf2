use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use sysgraph_core::state::{CounterSnapshot, HostInfo, InterfaceCounters, PartitionUsage};
use sysinfo::{Disks, Networks, System};
use tracing::{debug, warn};

use crate::procfs;

/// Anything that can capture raw OS counters.
///
/// `capture` never fails: a subsystem that cannot be read is reported through
/// `tracing` and left at its zero value in the returned snapshot. Failed
/// counter reads are also flagged (`disks_ok`, `interfaces_ok`).
pub trait CounterSource: Send {
    fn capture(&mut self) -> CounterSnapshot;

    /// Static machine facts, shown alongside the graphs.
    fn host_info(&self) -> HostInfo;
}

/// [`CounterSource`] backed by `sysinfo`, plus procfs/sysfs on Linux.
pub struct SysinfoSource {
    sys:        System,
    networks:   Networks,
    root_mount: PathBuf,
    /// Subsystems that already failed once; repeats are logged at debug.
    degraded:   HashSet<&'static str>,
}

impl SysinfoSource {
    pub fn new(root_mount: impl Into<PathBuf>) -> Self {
        let mut sys = System::new_all();
        // CPU usage is a delta between refreshes; prime the first one.
        sys.refresh_cpu_usage();

        Self {
            sys,
            networks: Networks::new_with_refreshed_list(),
            root_mount: root_mount.into(),
            degraded: HashSet::new(),
        }
    }

    fn report(&mut self, subsystem: &'static str, reason: impl Display) {
        if self.degraded.insert(subsystem) {
            warn!("{subsystem} unavailable, reporting zero: {reason}");
        } else {
            debug!("{subsystem} still unavailable: {reason}");
        }
    }

    fn recovered(&mut self, subsystem: &'static str) {
        if self.degraded.remove(subsystem) {
            debug!("{subsystem} readable again");
        }
    }

    fn check_memory(&mut self, memory_total: u64) {
        if memory_total == 0 {
            self.report("memory usage", "total memory reported as zero");
        } else {
            self.recovered("memory usage");
        }
    }

    /// Interfaces plus whether the list is usable as a counter reading.
    fn read_interfaces(&mut self) -> (Vec<InterfaceCounters>, bool) {
        self.networks.refresh(true);

        let mut interfaces: Vec<InterfaceCounters> = self
            .networks
            .list()
            .iter()
            .map(|(name, data)| {
                let flags = procfs::read_interface_flags(name);
                InterfaceCounters {
                    name:           name.clone(),
                    index:          flags.index,
                    is_up:          flags.is_up,
                    is_loopback:    flags.is_loopback,
                    has_address:    !data.ip_networks().is_empty(),
                    bytes_received: data.total_received(),
                    bytes_sent:     data.total_transmitted(),
                }
            })
            .collect();

        // `Networks` is a hash map; restore the kernel's ordering.
        interfaces.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.name.cmp(&b.name)));

        if interfaces.is_empty() {
            self.report("network counters", "no interfaces listed");
            (interfaces, false)
        } else {
            self.recovered("network counters");
            (interfaces, true)
        }
    }

    fn read_disks(&mut self) -> (f64, Vec<PartitionUsage>) {
        let disks = Disks::new_with_refreshed_list();
        let partitions: Vec<PartitionUsage> = disks
            .iter()
            .map(|d| PartitionUsage {
                device:      d.name().to_string_lossy().into_owned(),
                mount_point: d.mount_point().display().to_string(),
                total_bytes: d.total_space(),
                used_bytes:  d.total_space().saturating_sub(d.available_space()),
            })
            .collect();

        let root = self.root_mount.clone();
        match root_percent(&partitions, &root) {
            Some(percent) => {
                self.recovered("root filesystem usage");
                (percent, partitions)
            }
            None => {
                self.report(
                    "root filesystem usage",
                    format!("no mounted filesystem at '{}'", root.display()),
                );
                (0.0, partitions)
            }
        }
    }
}

impl CounterSource for SysinfoSource {
    fn capture(&mut self) -> CounterSnapshot {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();

        let cpu_percent = f64::from(self.sys.global_cpu_usage());
        let memory_used = self.sys.used_memory();
        let memory_total = self.sys.total_memory();
        self.check_memory(memory_total);

        let (interfaces, interfaces_ok) = self.read_interfaces();
        let (disk_percent, partitions) = self.read_disks();

        let (disks, disks_ok) = match procfs::read_disk_io() {
            Ok(disks) => {
                self.recovered("disk I/O counters");
                (disks, true)
            }
            Err(e) => {
                self.report("disk I/O counters", e);
                (BTreeMap::new(), false)
            }
        };

        CounterSnapshot {
            taken_at: Instant::now(),
            captured_at: Local::now(),
            cpu_percent,
            memory_used,
            memory_total,
            disk_percent,
            interfaces,
            interfaces_ok,
            disks,
            disks_ok,
            partitions,
        }
    }

    fn host_info(&self) -> HostInfo {
        let cpus = self.sys.cpus();
        HostInfo {
            cpu_model:      cpus.first().map(|c| c.brand().trim().to_string()).unwrap_or_default(),
            logical_cores:  cpus.len(),
            physical_cores: System::physical_core_count(),
            memory_total:   self.sys.total_memory(),
        }
    }
}

/// Used-space percentage of the partition mounted at `mount`.
fn root_percent(partitions: &[PartitionUsage], mount: &Path) -> Option<f64> {
    partitions
        .iter()
        .find(|p| Path::new(&p.mount_point) == mount)
        .filter(|p| p.total_bytes > 0)
        .map(|p| p.used_bytes as f64 / p.total_bytes as f64 * 100.0)
}
