pub mod schema;

pub use schema::{DiskConfig, NetworkConfig, OutputFormat, RendererConfig, SamplerConfig, SysgraphConfig};

use std::path::{Path, PathBuf};
use sysgraph_core::{MonitorError, Result};

/// Load configuration from a TOML file.  Returns `SysgraphConfig::default()`
/// if the file doesn't exist so the monitor always has sensible defaults.
///
/// The parsed config is validated before it is returned.
pub fn load(path: impl AsRef<Path>) -> Result<SysgraphConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(SysgraphConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| MonitorError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse and validate a TOML document.
pub fn parse(raw: &str) -> Result<SysgraphConfig> {
    let config: SysgraphConfig =
        toml::from_str(raw).map_err(|e| MonitorError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("sysgraph").join("sysgraph.toml")
}
