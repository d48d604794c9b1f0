//! Priority-refresh ticker.
//!
//! Periodically asks the queue-assigner to recompute priorities so that long-waiting,
//! low-priority patients are not starved. The ticker has no caller to report to, so
//! failures are logged and the next tick proceeds as normal.

use crate::assigner::QueueAssigner;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Handle to the background refresh task.
///
/// The task stops when [`PriorityRefresher::shutdown`] is called or the handle is dropped.
pub struct PriorityRefresher {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PriorityRefresher {
    /// Starts the ticker. The first refresh happens one `period` after start.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(assigner: Arc<dyn QueueAssigner>, period: Duration) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(assigner, period, shutdown_rx));
        tracing::info!("priority refresh every {}s", period.as_secs());
        Self { shutdown, task }
    }

    /// Stops the ticker and waits for it to finish. An in-flight refresh completes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("priority refresh task failed: {e}");
        }
    }
}

async fn run(assigner: Arc<dyn QueueAssigner>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    // A slow refresh pushes the schedule back instead of firing a burst.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => refresh_once(assigner.as_ref()).await,
            // Err means the handle was dropped.
            _ = shutdown.changed() => break,
        }
    }

    tracing::info!("priority refresh stopped");
}

async fn refresh_once(assigner: &dyn QueueAssigner) {
    match assigner.update_priorities().await {
        Ok(()) => tracing::info!("triggered priority update for waiting patients"),
        Err(e) => tracing::warn!("failed to trigger priority update: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeAssigner, PredictMode};

    fn calls(fake: &FakeAssigner) -> usize {
        fake.state.lock().unwrap().refresh_calls
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_once_per_period() {
        let fake = Arc::new(FakeAssigner::new(PredictMode::Enqueue));
        let refresher = PriorityRefresher::spawn(fake.clone(), Duration::from_secs(300));

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(calls(&fake), 0);

        tokio::time::sleep(Duration::from_secs(602)).await;
        assert_eq!(calls(&fake), 3);

        refresher.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_ticker() {
        let fake = Arc::new(FakeAssigner::new(PredictMode::Enqueue));
        fake.state.lock().unwrap().fail_refresh = true;
        let refresher = PriorityRefresher::spawn(fake.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(181)).await;
        assert_eq!(calls(&fake), 3);

        refresher.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_refresh_after_shutdown() {
        let fake = Arc::new(FakeAssigner::new(PredictMode::Enqueue));
        let refresher = PriorityRefresher::spawn(fake.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(61)).await;
        refresher.shutdown().await;
        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(calls(&fake), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_task() {
        let fake = Arc::new(FakeAssigner::new(PredictMode::Enqueue));
        drop(PriorityRefresher::spawn(fake.clone(), Duration::from_secs(60)));

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(calls(&fake), 0);
    }
}
