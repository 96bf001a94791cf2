//! sysgraph — samples CPU, memory, disk and network once per tick and renders
//! rolling graphs of the last few seconds.
//!
//! Run with:  `RUST_LOG=info sysgraph [path/to/sysgraph.toml]`

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging on stderr so stdout stays clean for the renderer.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("sysgraph v{} starting", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(sysgraph_config::default_path);
    let config = sysgraph_config::load(&path)
        .with_context(|| format!("loading config from '{}'", path.display()))?;

    let mut renderer = sysgraph_renderer::from_config(&config.renderer, std::io::stdout());
    renderer.init()?;
    tracing::info!(
        renderer = renderer.id(),
        interval_ms = config.sampler.interval_ms,
        history_len = config.sampler.history_len,
        "sampling"
    );

    let (monitor, mut frames) = sysgraph_system::spawn_monitor(&config);

    // Installed once for the whole run.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("interrupt received, shutting down");
                break Ok(());
            }
            frame = frames.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = renderer.render(&frame) {
                        break Err(e).context("rendering frame");
                    }
                }
                None => break Ok(()),
            },
        }
    };

    monitor.join().await;
    outcome
}
