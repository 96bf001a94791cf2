//! Bundled renderers for the monitor.
//!
//! The graphical front-end lives outside this workspace; these renderers let
//! the sampler run headless:
//! - [`TextRenderer`]: one human-readable block per tick with sparklines
//! - [`JsonRenderer`]: one JSON object per line, for piping into other tools

pub mod format;

use std::io::Write;
use sysgraph_config::{OutputFormat, RendererConfig};
use sysgraph_core::{MetricsFrame, MonitorError, Renderer, Result};

use format::{format_gib, format_rate, sparkline};

/// Build the renderer selected in the configuration, writing to `out`.
pub fn from_config<W: Write + Send + 'static>(config: &RendererConfig, out: W) -> Box<dyn Renderer> {
    match config.format {
        OutputFormat::Text => Box::new(TextRenderer::new(out, config.net_ceiling_mbps)),
        OutputFormat::Json => Box::new(JsonRenderer::new(out)),
    }
}

/// Plain-text dashboard: CPU, RAM, disk and network panels.
#[derive(Debug)]
pub struct TextRenderer<W> {
    out:         W,
    net_ceiling: f64,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, net_ceiling_mbps: f64) -> Self {
        Self { out, net_ceiling: net_ceiling_mbps }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, frame: &MetricsFrame) -> std::io::Result<()> {
        let h = &frame.history;
        let host = &frame.host;
        let out = &mut self.out;

        writeln!(out, "── {} ─ tick {}", frame.captured_at.format("%H:%M:%S"), frame.tick)?;

        writeln!(
            out,
            "CPU   {:>6.2}%  {}  MODEL: {} ({} logical / {} physical)",
            frame.cpu_percent,
            sparkline(&h.cpu, 100.0),
            host.cpu_model,
            host.logical_cores,
            host.physical_cores.map_or_else(|| "?".to_string(), |n| n.to_string()),
        )?;

        writeln!(
            out,
            "RAM   {:>6.2}%  {}  Total Size: {}",
            frame.memory_percent,
            sparkline(&h.memory, 100.0),
            format_gib(host.memory_total),
        )?;

        writeln!(
            out,
            "Disk  {:>6.2}%  Read {}  Write {}",
            frame.disk_percent,
            format_rate(MetricsFrame::latest(&h.disk_read)),
            format_rate(MetricsFrame::latest(&h.disk_write)),
        )?;
        writeln!(out, "      read  {}", sparkline(&h.disk_read, 100.0))?;
        writeln!(out, "      write {}", sparkline(&h.disk_write, 100.0))?;
        for p in &frame.partitions {
            writeln!(
                out,
                "      {} on {}  Total: {}  Used: {}",
                p.device,
                p.mount_point,
                format_gib(p.total_bytes),
                format_gib(p.used_bytes),
            )?;
        }

        writeln!(
            out,
            "Net   [{}]  Read {}  Write {}",
            frame.active_interface.as_deref().unwrap_or("none"),
            format_rate(MetricsFrame::latest(&h.net_read)),
            format_rate(MetricsFrame::latest(&h.net_write)),
        )?;
        writeln!(out, "      read  {}", sparkline(&h.net_read, self.net_ceiling))?;
        writeln!(out, "      write {}", sparkline(&h.net_write, self.net_ceiling))?;

        out.flush()
    }
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn id(&self) -> &str {
        "text"
    }

    fn render(&mut self, frame: &MetricsFrame) -> Result<()> {
        self.write_frame(frame).map_err(MonitorError::from)
    }
}

/// Newline-delimited JSON, one object per frame.
#[derive(Debug)]
pub struct JsonRenderer<W> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for JsonRenderer<W> {
    fn id(&self) -> &str {
        "json"
    }

    fn render(&mut self, frame: &MetricsFrame) -> Result<()> {
        serde_json::to_writer(&mut self.out, frame)
            .map_err(|e| MonitorError::Render(format!("cannot encode frame: {e}")))?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
