use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use sysgraph_core::{MonitorError, Result};

/// Root configuration structure parsed from `sysgraph.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SysgraphConfig {
    /// Tick cadence and history sizing.
    pub sampler: SamplerConfig,
    /// Active-interface selection.
    pub network: NetworkConfig,
    /// Disk I/O device selection.
    pub disk: DiskConfig,
    /// Output settings for the bundled renderers.
    pub renderer: RendererConfig,
}

impl SysgraphConfig {
    /// Reject values the sampler cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.sampler.interval_ms == 0 {
            return Err(MonitorError::Config(
                "sampler.interval_ms must be greater than zero".into(),
            ));
        }
        if self.sampler.history_len < 2 {
            return Err(MonitorError::Config(
                "sampler.history_len must be at least 2".into(),
            ));
        }
        if self.network.interface.is_none() && self.network.patterns.is_empty() {
            return Err(MonitorError::Config(
                "network.patterns must not be empty unless network.interface is set".into(),
            ));
        }
        if !(self.renderer.net_ceiling_mbps.is_finite() && self.renderer.net_ceiling_mbps > 0.0) {
            return Err(MonitorError::Config(
                "renderer.net_ceiling_mbps must be a positive number".into(),
            ));
        }
        Ok(())
    }
}

/// Sampling loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Milliseconds between ticks.
    pub interval_ms: u64,
    /// Number of samples kept per graph (the visible window width).
    pub history_len: usize,
    /// Mount point whose used-space percentage is reported.
    pub root_mount: PathBuf,
}

impl SamplerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            history_len: 11,
            root_mount: PathBuf::from("/"),
        }
    }
}

/// How the interface used for network rates is chosen each tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Case-insensitive name fragments, in no particular priority; the first
    /// qualifying interface in OS order whose name contains any of them wins.
    pub patterns: Vec<String>,
    /// Pin rates to this interface instead of using the heuristic.
    pub interface: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["wlan".into(), "wi-fi".into(), "eth".into()],
            interface: None,
        }
    }
}

/// Which block devices contribute to the disk read/write rates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    /// Device names to include (e.g. `["nvme0n1"]`); empty means all.
    pub devices: Vec<String>,
}

impl DiskConfig {
    pub fn accepts(&self, device: &str) -> bool {
        self.devices.is_empty() || self.devices.iter().any(|d| d == device)
    }
}

/// Output format written by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings for the bundled renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub format: OutputFormat,
    /// Full-scale value of the network graphs, in MB/s.
    pub net_ceiling_mbps: f64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            net_ceiling_mbps: 100.0,
        }
    }
}
