use std::sync::Arc;

use session_task::{ShutdownSignal, Task};
use tracing::{info, warn};

use crate::manager::SessionManager;

/// Runs `cleanup_expired` on a fixed interval until shut down: a `tokio::select!` between an
/// interval tick and the shutdown signal. Sweep failures are logged and never propagate — a
/// single pass being skipped does not compromise the system, since expiration is always
/// enforced again at the next issue/validate via the store predicate.
pub struct CleanupTask {
    manager: Arc<SessionManager>,
    interval: std::time::Duration,
}

impl CleanupTask {
    pub fn new(manager: Arc<SessionManager>, interval: std::time::Duration) -> Self {
        Self { manager, interval }
    }
}

#[async_trait::async_trait]
impl Task for CleanupTask {
    type Output = ();

    const NAME: &'static str = "session_cleanup";

    async fn run(self, mut shutdown_signal: ShutdownSignal) -> Self::Output {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.manager.cleanup_expired().await {
                        Ok((browser_deleted, service_deleted)) => {
                            if browser_deleted > 0 || service_deleted > 0 {
                                info!(browser_deleted, service_deleted, "Cleanup sweep removed expired sessions");
                            }
                        }
                        Err(error) => warn!(%error, "Session cleanup sweep failed"),
                    }
                }
                _ = shutdown_signal.wait() => {
                    break;
                }
            }
        }
    }
}
