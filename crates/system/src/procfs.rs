//! Linux kernel interfaces for the counters `sysinfo` does not expose:
//! per-device disk I/O from `/proc/diskstats` and interface flags from
//! `/sys/class/net`.

use std::collections::BTreeMap;
use std::path::Path;
use sysgraph_core::{state::DiskIoCounters, MonitorError, Result};

/// `/proc/diskstats` always counts in 512-byte sectors, whatever the device's
/// real sector size.
const SECTOR_BYTES: u64 = 512;

const IFF_UP: u32 = 0x1;
const IFF_LOOPBACK: u32 = 0x8;

/// Read per-device cumulative I/O for whole disks.
pub fn read_disk_io() -> Result<BTreeMap<String, DiskIoCounters>> {
    let raw = std::fs::read_to_string("/proc/diskstats")
        .map_err(|e| MonitorError::System(format!("cannot read /proc/diskstats: {e}")))?;
    let block = Path::new("/sys/block");
    Ok(parse_diskstats(&raw, |name| is_physical_disk(block, name)))
}

/// A whole disk that is not built on top of other block devices.
///
/// Partitions have no `/sys/block` entry; device-mapper and md arrays list
/// their members under `slaves/`, and their I/O is already counted there.
pub fn is_physical_disk(block_root: &Path, name: &str) -> bool {
    let dev = block_root.join(name);
    if !dev.exists() {
        return false;
    }
    match std::fs::read_dir(dev.join("slaves")) {
        Ok(mut slaves) => slaves.next().is_none(),
        Err(_) => true,
    }
}

/// Parse `/proc/diskstats` content.
///
/// `is_whole_disk` filters out partitions (`sda1` alongside `sda`) so bytes
/// are not counted twice.  Loop, RAM, device-mapper and md devices are
/// always skipped. Malformed lines are ignored.
pub fn parse_diskstats(
    raw: &str,
    is_whole_disk: impl Fn(&str) -> bool,
) -> BTreeMap<String, DiskIoCounters> {
    let mut disks = BTreeMap::new();

    for line in raw.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // major minor name reads merged sectors_read ms writes merged sectors_written ...
        if fields.len() < 10 {
            continue;
        }
        let name = fields[2];
        if is_virtual_or_stacked(name) || !is_whole_disk(name) {
            continue;
        }
        let (Ok(read), Ok(written)) = (fields[5].parse::<u64>(), fields[9].parse::<u64>()) else {
            tracing::trace!("skipping malformed diskstats line: {line}");
            continue;
        };
        disks.insert(
            name.to_string(),
            DiskIoCounters {
                bytes_read:    read.saturating_mul(SECTOR_BYTES),
                bytes_written: written.saturating_mul(SECTOR_BYTES),
            },
        );
    }

    disks
}

fn is_virtual_or_stacked(name: &str) -> bool {
    ["loop", "ram", "zram", "dm-", "md"].iter().any(|p| name.starts_with(p))
}

/// Flags of a network interface as reported by sysfs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceFlags {
    pub index: u32,
    pub is_up: bool,
    pub is_loopback: bool,
}

/// Read `/sys/class/net/<name>/{flags,ifindex}`.
///
/// Falls back to [`InterfaceFlags::guess`] when sysfs is unavailable.
pub fn read_interface_flags(name: &str) -> InterfaceFlags {
    let base = Path::new("/sys/class/net").join(name);
    let flags = std::fs::read_to_string(base.join("flags"))
        .ok()
        .and_then(|raw| parse_hex_flags(&raw));
    let index = std::fs::read_to_string(base.join("ifindex"))
        .ok()
        .and_then(|raw| raw.trim().parse::<u32>().ok());

    match (flags, index) {
        (Some(flags), index) => InterfaceFlags {
            index:       index.unwrap_or(u32::MAX),
            is_up:       flags & IFF_UP != 0,
            is_loopback: flags & IFF_LOOPBACK != 0,
        },
        (None, _) => InterfaceFlags::guess(name),
    }
}

impl InterfaceFlags {
    /// Best effort when the kernel can't be asked: assume up, and treat
    /// `lo`-prefixed names as loopback.
    pub fn guess(name: &str) -> Self {
        Self {
            index:       u32::MAX,
            is_up:       true,
            is_loopback: name.starts_with("lo"),
        }
    }
}

/// Parse a sysfs flags value such as `0x1003`.
pub fn parse_hex_flags(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    u32::from_str_radix(digits, 16).ok()
}
