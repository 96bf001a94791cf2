pub mod history;
pub mod interface;
pub mod procfs;
pub mod rate;
pub mod reader;
pub mod sampler;

pub use history::{History, RollingBuffer};
pub use reader::{CounterSource, SysinfoSource};
pub use sampler::Sampler;

use std::sync::Arc;
use std::time::Duration;
use sysgraph_config::SysgraphConfig;
use sysgraph_core::state::MetricsFrame;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

/// Control handle for the background sampler task.
///
/// Dropping the handle does not stop the task; call [`MonitorHandle::stop`]
/// or drop the frame receiver.
#[derive(Debug)]
pub struct MonitorHandle {
    stop: Arc<Notify>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Ask the sampler to stop after its current tick.
    pub fn stop(&self) {
        self.stop.notify_one();
    }

    /// Stop the sampler and wait until its timer is gone.
    pub async fn join(self) {
        self.stop();
        if let Err(e) = self.task.await {
            warn!("system monitor task ended abnormally: {e}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a background Tokio task that samples the OS every
/// `config.sampler.interval_ms` milliseconds and forwards [`MetricsFrame`]s
/// through the returned channel.
///
/// The task stops when the receiver is dropped or the handle is stopped.
pub fn spawn_monitor(config: &SysgraphConfig) -> (MonitorHandle, mpsc::Receiver<MetricsFrame>) {
    let source = SysinfoSource::new(config.sampler.root_mount.clone());
    spawn_sampler(Sampler::new(source, config), config.sampler.interval())
}

/// Drive an existing [`Sampler`] on a fixed interval.
pub fn spawn_sampler<S>(
    mut sampler: Sampler<S>,
    interval: Duration,
) -> (MonitorHandle, mpsc::Receiver<MetricsFrame>)
where
    S: CounterSource + 'static,
{
    let (tx, rx) = mpsc::channel(4);
    let stop = Arc::new(Notify::new());
    let stopped = Arc::clone(&stop);

    let task = tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the baseline was just taken.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = stopped.notified() => break,
                _ = ticker.tick() => {}
            }

            let frame = sampler.tick();

            tokio::select! {
                _ = stopped.notified() => break,
                sent = tx.send(frame) => {
                    if sent.is_err() {
                        break; // receiver dropped
                    }
                }
            }
        }

        info!("system monitor stopped");
    });

    (MonitorHandle { stop, task }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::tests::ScriptedSource;
    use sysgraph_core::state::CounterSnapshot;

    fn scripted() -> Sampler<ScriptedSource> {
        let busy = CounterSnapshot { cpu_percent: 12.0, ..CounterSnapshot::empty() };
        Sampler::new(
            ScriptedSource::new(vec![CounterSnapshot::empty(), busy]),
            &SysgraphConfig::default(),
        )
    }

    #[tokio::test]
    async fn frames_flow_until_stopped() {
        let (handle, mut rx) = spawn_sampler(scripted(), Duration::from_millis(5));

        let first = rx.recv().await.expect("first frame");
        assert_eq!(first.tick, 1);
        assert_eq!(first.cpu_percent, 12.0);
        let second = rx.recv().await.expect("second frame");
        assert_eq!(second.tick, 2);

        handle.join().await;
        while rx.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn dropping_receiver_ends_task() {
        let (handle, rx) = spawn_sampler(scripted(), Duration::from_millis(5));
        drop(rx);
        time::timeout(Duration::from_secs(5), async {
            while !handle.is_finished() {
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("task should end once the receiver is gone");
    }
}
