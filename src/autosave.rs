// Periodic ledger flush with an explicit shutdown hook

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::app_state::SharedState;
use crate::handlers::lock;

/// Handle to the running auto-save task.
pub struct AutosaveHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Stop the loop and wait for its final flush.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            error!("Auto-save task ended abnormally: {}", e);
        }
    }
}

/// Spawn the auto-save loop. Each tick sweeps expired sessions and rewrites both ledger files.
pub fn spawn(state: SharedState, every: Duration) -> AutosaveHandle {
    let (stop, mut stopped) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = interval(every.max(Duration::from_millis(10)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => tick(&state),
                changed = stopped.changed() => {
                    if changed.is_err() || *stopped.borrow() {
                        break;
                    }
                }
            }
        }

        flush(&state);
        info!("✅ Final save complete, auto-save stopped");
    });

    AutosaveHandle { stop, task }
}

fn tick(state: &SharedState) {
    let mut app_state = lock(state);
    let ttl = app_state.session_ttl;
    let purged = app_state.sessions.purge_expired(ttl);
    if purged > 0 {
        warn!("🧹 Dropped {} expired sessions", purged);
    }
    match app_state.ledger.save_to_disk() {
        Ok(()) => debug!("Auto-saved ledger"),
        Err(e) => error!("Auto-save failed: {}", e),
    }
}

fn flush(state: &SharedState) {
    let app_state = lock(state);
    if let Err(e) = app_state.save_to_disk() {
        error!("❌ Failed to save ledger: {}", e);
    }
}
