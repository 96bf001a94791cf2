use sysgraph_config::{DiskConfig, NetworkConfig, SysgraphConfig};
use sysgraph_core::state::{CounterSnapshot, HostInfo, MetricsFrame};
use tracing::{debug, trace};

use crate::{
    history::{History, TickSamples},
    interface, rate,
    reader::CounterSource,
};

/// Owns everything that changes between ticks: the counter source, the
/// last good counter readings, and the rolling history.
///
/// Disk and network counters keep separate baselines. A failed read leaves
/// its baseline untouched, so the next good read is measured against the
/// last good one over the real elapsed time.
pub struct Sampler<S> {
    source:        S,
    network:       NetworkConfig,
    disk:          DiskConfig,
    host:          HostInfo,
    disk_baseline: CounterSnapshot,
    net_baseline:  CounterSnapshot,
    history:       History,
    ticks:         u64,
}

impl<S: CounterSource> Sampler<S> {
    /// Take a baseline capture so the first tick already has a delta.
    pub fn new(mut source: S, config: &SysgraphConfig) -> Self {
        let baseline = source.capture();
        let host = source.host_info();
        Self {
            source,
            network: config.network.clone(),
            disk: config.disk.clone(),
            host,
            disk_baseline: baseline.clone(),
            net_baseline: baseline,
            history: History::new(config.sampler.history_len),
            ticks: 0,
        }
    }

    /// Capture, derive, record, and return the frame for this tick.
    pub fn tick(&mut self) -> MetricsFrame {
        let current = self.source.capture();
        self.ticks += 1;

        let active = interface::select_active(&current.interfaces, &self.network)
            .map(|i| i.name.clone());
        let net_elapsed = rate::elapsed_secs(&self.net_baseline, &current);
        let (net_read, net_write) = match &active {
            Some(name) if self.net_baseline.interfaces_ok && current.interfaces_ok => {
                rate::interface_rates(&self.net_baseline, &current, name, net_elapsed)
            }
            Some(_) => (0.0, 0.0),
            None => {
                debug!("no qualifying network interface; reporting zero throughput");
                (0.0, 0.0)
            }
        };

        let disk_elapsed = rate::elapsed_secs(&self.disk_baseline, &current);
        let (disk_read, disk_write) = if self.disk_baseline.disks_ok && current.disks_ok {
            rate::aggregate_disk_rates(
                &self.disk_baseline.disks,
                &current.disks,
                disk_elapsed,
                |device| self.disk.accepts(device),
            )
        } else {
            (0.0, 0.0)
        };

        let samples = TickSamples {
            cpu:    rate::gauge(current.cpu_percent),
            memory: rate::gauge(current.memory_percent()),
            disk_read,
            disk_write,
            net_read,
            net_write,
        };
        trace!(tick = self.ticks, disk_elapsed, net_elapsed, ?samples, "sampled");
        self.history.push(samples);

        let frame = MetricsFrame {
            tick:             self.ticks,
            captured_at:      current.captured_at,
            cpu_percent:      samples.cpu,
            memory_percent:   samples.memory,
            disk_percent:     rate::gauge(current.disk_percent),
            active_interface: active,
            history:          self.history.snapshot(),
            partitions:       current.partitions.clone(),
            host:             self.host.clone(),
        };

        self.advance_baselines(current);
        frame
    }

    fn advance_baselines(&mut self, current: CounterSnapshot) {
        match (current.disks_ok, current.interfaces_ok) {
            (true, true) => {
                self.disk_baseline = current.clone();
                self.net_baseline = current;
            }
            (true, false) => self.disk_baseline = current,
            (false, true) => self.net_baseline = current,
            (false, false) => {}
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::{BTreeMap, VecDeque};
    use std::time::{Duration, Instant};
    use sysgraph_core::state::{DiskIoCounters, InterfaceCounters};

    const MIB: u64 = 1 << 20;

    /// Replays scripted snapshots, one second apart.
    pub(crate) struct ScriptedSource {
        script:            VecDeque<CounterSnapshot>,
        start:             Instant,
        captures:          u32,
    }

    impl ScriptedSource {
        pub(crate) fn new(script: Vec<CounterSnapshot>) -> Self {
            Self {
                script:   script.into(),
                start:    Instant::now(),
                captures: 0,
            }
        }
    }

    impl CounterSource for ScriptedSource {
        fn capture(&mut self) -> CounterSnapshot {
            let mut snapshot = self
                .script
                .pop_front()
                .unwrap_or_else(CounterSnapshot::empty);
            snapshot.taken_at = self.start + Duration::from_secs(u64::from(self.captures));
            self.captures += 1;
            snapshot
        }

        fn host_info(&self) -> HostInfo {
            HostInfo {
                cpu_model: "Test CPU".into(),
                logical_cores: 8,
                physical_cores: Some(4),
                memory_total: 16 << 30,
            }
        }
    }

    fn with_disk(name: &str, bytes_read: u64, bytes_written: u64) -> CounterSnapshot {
        let mut disks = BTreeMap::new();
        disks.insert(name.to_string(), DiskIoCounters { bytes_read, bytes_written });
        CounterSnapshot { disks, ..CounterSnapshot::empty() }
    }

    fn with_iface(name: &str, rx: u64, tx: u64) -> CounterSnapshot {
        CounterSnapshot {
            interfaces: vec![InterfaceCounters {
                name: name.into(),
                index: 2,
                is_up: true,
                is_loopback: false,
                has_address: true,
                bytes_received: rx,
                bytes_sent: tx,
            }],
            ..CounterSnapshot::empty()
        }
    }

    fn sampler(script: Vec<CounterSnapshot>) -> Sampler<ScriptedSource> {
        Sampler::new(ScriptedSource::new(script), &SysgraphConfig::default())
    }

    #[test]
    fn ten_mib_in_one_second_is_ten_mb_per_second() {
        let mut s = sampler(vec![with_disk("sda", 0, 0), with_disk("sda", 10 * MIB, 0)]);
        let frame = s.tick();
        assert_eq!(MetricsFrame::latest(&frame.history.disk_read), 10.0);
        assert_eq!(MetricsFrame::latest(&frame.history.disk_write), 0.0);
    }

    #[test]
    fn cpu_gauge_is_published_untouched() {
        let reading = CounterSnapshot { cpu_percent: 42.5, ..CounterSnapshot::empty() };
        let mut s = sampler(vec![CounterSnapshot::empty(), reading]);
        let frame = s.tick();
        assert_eq!(frame.cpu_percent, 42.5);
        assert_eq!(MetricsFrame::latest(&frame.history.cpu), 42.5);
    }

    #[test]
    fn memory_percent_from_snapshot() {
        let reading = CounterSnapshot {
            memory_used: 3 << 30,
            memory_total: 12 << 30,
            ..CounterSnapshot::empty()
        };
        let mut s = sampler(vec![CounterSnapshot::empty(), reading]);
        assert_eq!(s.tick().memory_percent, 25.0);
    }

    #[test]
    fn no_qualifying_interface_reports_zero() {
        let mut s = sampler(vec![
            with_iface("enp3s0", 0, 0),
            with_iface("enp3s0", 50 * MIB, 50 * MIB),
        ]);
        let frame = s.tick();
        assert_eq!(frame.active_interface, None);
        assert_eq!(MetricsFrame::latest(&frame.history.net_read), 0.0);
        assert_eq!(MetricsFrame::latest(&frame.history.net_write), 0.0);
    }

    #[test]
    fn network_rate_against_previous_tick() {
        let mut s = sampler(vec![
            with_iface("wlan0", MIB, 0),
            with_iface("wlan0", 4 * MIB, 2 * MIB),
        ]);
        let frame = s.tick();
        assert_eq!(frame.active_interface.as_deref(), Some("wlan0"));
        assert_eq!(MetricsFrame::latest(&frame.history.net_read), 3.0);
        assert_eq!(MetricsFrame::latest(&frame.history.net_write), 2.0);
    }

    #[test]
    fn vanished_disk_does_not_break_the_tick() {
        let mut prev = with_disk("sda", 0, 0);
        prev.disks.insert("sdb".into(), DiskIoCounters { bytes_read: MIB, bytes_written: MIB });
        let mut s = sampler(vec![prev, with_disk("sda", 2 * MIB, 0)]);
        let frame = s.tick();
        assert_eq!(MetricsFrame::latest(&frame.history.disk_read), 2.0);
    }

    #[test]
    fn disk_filter_from_config() {
        let mut config = SysgraphConfig::default();
        config.disk.devices = vec!["sdb".into()];
        let mut prev = with_disk("sda", 0, 0);
        prev.disks.insert("sdb".into(), DiskIoCounters::default());
        let mut curr = with_disk("sda", 8 * MIB, 0);
        curr.disks.insert("sdb".into(), DiskIoCounters { bytes_read: MIB, bytes_written: 0 });
        let mut s = Sampler::new(ScriptedSource::new(vec![prev, curr]), &config);
        assert_eq!(MetricsFrame::latest(&s.tick().history.disk_read), 1.0);
    }

    #[test]
    fn counter_reset_yields_zero() {
        let mut s = sampler(vec![with_disk("sda", 10 * MIB, 10 * MIB), with_disk("sda", MIB, MIB)]);
        let frame = s.tick();
        assert_eq!(MetricsFrame::latest(&frame.history.disk_read), 0.0);
        assert_eq!(MetricsFrame::latest(&frame.history.disk_write), 0.0);
    }

    #[test]
    fn frames_carry_full_fixed_windows() {
        let mut s = sampler(Vec::new());
        let first = s.tick();
        assert_eq!(first.tick, 1);
        assert_eq!(first.history.cpu.len(), 11);
        assert_eq!(first.history.net_write, vec![0.0; 11]);
        assert_eq!(first.host.logical_cores, 8);

        for _ in 0..20 {
            s.tick();
        }
        let frame = s.tick();
        assert_eq!(frame.tick, 22);
        assert_eq!(frame.history.disk_read.len(), 11);
        assert_eq!(s.history().memory.len(), 11);
    }

    #[test]
    fn failed_disk_read_does_not_spike_the_next_tick() {
        let base = 100 * 1024 * MIB;
        let failed = CounterSnapshot { disks_ok: false, ..CounterSnapshot::empty() };
        let mut s = sampler(vec![
            with_disk("sda", base, base),
            failed,
            with_disk("sda", base + 2 * MIB, base),
        ]);

        let during = s.tick();
        assert_eq!(MetricsFrame::latest(&during.history.disk_read), 0.0);

        // Two seconds since the last good reading.
        let after = s.tick();
        assert_eq!(MetricsFrame::latest(&after.history.disk_read), 1.0);
        assert_eq!(MetricsFrame::latest(&after.history.disk_write), 0.0);
    }

    #[test]
    fn failed_baseline_reports_zero_until_a_good_pair() {
        let failed = CounterSnapshot { disks_ok: false, ..CounterSnapshot::empty() };
        let mut s = sampler(vec![
            failed,
            with_disk("sda", 50 * MIB, 0),
            with_disk("sda", 53 * MIB, 0),
        ]);
        assert_eq!(MetricsFrame::latest(&s.tick().history.disk_read), 0.0);
        assert_eq!(MetricsFrame::latest(&s.tick().history.disk_read), 3.0);
    }

    #[test]
    fn failed_network_read_does_not_spike_the_next_tick() {
        let failed = CounterSnapshot { interfaces_ok: false, ..CounterSnapshot::empty() };
        let mut s = sampler(vec![
            with_iface("eth0", 500 * MIB, 500 * MIB),
            failed,
            with_iface("eth0", 504 * MIB, 502 * MIB),
        ]);

        let during = s.tick();
        assert_eq!(during.active_interface, None);
        assert_eq!(MetricsFrame::latest(&during.history.net_read), 0.0);

        let after = s.tick();
        assert_eq!(after.active_interface.as_deref(), Some("eth0"));
        assert_eq!(MetricsFrame::latest(&after.history.net_read), 2.0);
        assert_eq!(MetricsFrame::latest(&after.history.net_write), 1.0);
    }

    #[test]
    fn frames_are_independent_copies() {
        let mut s = sampler(vec![
            CounterSnapshot::empty(),
            CounterSnapshot { cpu_percent: 10.0, ..CounterSnapshot::empty() },
            CounterSnapshot { cpu_percent: 20.0, ..CounterSnapshot::empty() },
        ]);
        let first = s.tick();
        let second = s.tick();
        assert_eq!(MetricsFrame::latest(&first.history.cpu), 10.0);
        assert_eq!(MetricsFrame::latest(&second.history.cpu), 20.0);
    }
}
