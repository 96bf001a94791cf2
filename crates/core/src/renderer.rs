use crate::{error::Result, state::MetricsFrame};

/// The presentation side of the monitor.
///
/// Renderers are purely reactive: they receive a read-only [`MetricsFrame`]
/// once per tick and redraw from it.  They never reach back into the sampler.
pub trait Renderer: Send {
    /// Unique string identifier, e.g. `"text"` or `"json"`.
    fn id(&self) -> &str;

    /// Called once before the first frame arrives.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Redraw from the latest frame.
    fn render(&mut self, frame: &MetricsFrame) -> Result<()>;
}
