use thiserror::Error;

/// Top-level error type used across the entire application.
///
/// Sampling never surfaces these to the renderer; subsystem read failures are
/// logged and replaced by neutral readings.  Only configuration and rendering
/// failures travel up to `main`.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("config error: {0}")]
    Config(String),

    #[error("system error: {0}")]
    System(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;
