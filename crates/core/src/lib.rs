pub mod error;
pub mod renderer;
pub mod state;

pub use error::{MonitorError, Result};
pub use renderer::Renderer;
pub use state::{CounterSnapshot, MetricsFrame};
