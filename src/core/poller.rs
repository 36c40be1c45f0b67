use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::core::api::ApiClient;
use crate::core::model::RunState;

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A run snapshot or the terminal poll failure, delivered over the poller
/// channel.
pub enum PollUpdate {
    Snapshot(RunState),
    /// Fetch errors end the poll loop; the only recovery is reloading the
    /// run view. The detailed cause goes to the log, the UI gets a flat
    /// message.
    Error(String),
}

/// Explicit, cancellable polling task for one run view.
///
/// The task fetches the run immediately, then on an interval, pushing each
/// snapshot over an mpsc channel. It terminates itself after delivering a
/// snapshot whose status is COMPLETED, FAILED or WAITING_FOR_INPUT, or after
/// any fetch error. The owning view drains the channel each UI tick and may
/// stop the task at any point; dropping the poller aborts it, so a dismounted
/// view can never leak a timer.
pub struct RunPoller {
    rx: mpsc::Receiver<PollUpdate>,
    handle: JoinHandle<()>,
}

impl RunPoller {
    pub fn spawn(api: ApiClient, run_id: String, interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(async move {
            loop {
                match api.get_run(&run_id).await {
                    Ok(run) => {
                        let settled = run.status.stops_polling();
                        debug!(run_id = %run_id, status = run.status.label(), "poll tick");
                        if tx.send(PollUpdate::Snapshot(run)).await.is_err() {
                            return; // view went away
                        }
                        if settled {
                            return;
                        }
                    }
                    Err(e) => {
                        error!(run_id = %run_id, "run fetch failed: {:#}", e);
                        let _ = tx
                            .send(PollUpdate::Error("Failed to load analysis.".to_string()))
                            .await;
                        return;
                    }
                }
                tokio::time::sleep(interval).await;
            }
        });
        Self { rx, handle }
    }

    /// Non-blocking drain, called once per UI tick.
    pub fn try_next(&mut self) -> Option<PollUpdate> {
        self.rx.try_recv().ok()
    }

    /// Blocking receive, for non-TUI consumers (and tests).
    pub async fn next(&mut self) -> Option<PollUpdate> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for RunPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
