//! Recurring liveness probe owned by the shell session.

use crate::session::ChatSession;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Background task that probes the relay immediately and then every
/// `interval`. Cancelled by [`LivenessProbe::stop`] or on drop.
pub struct LivenessProbe {
    shutdown_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl LivenessProbe {
    pub fn spawn(session: Arc<ChatSession>, interval: Duration) -> Self {
        let shutdown_token = CancellationToken::new();
        let shutdown = shutdown_token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = shutdown.cancelled() => break,
                            status = session.check_status() => {
                                tracing::debug!(?status, "Liveness probe completed");
                            }
                        }
                    }
                }
            }

            tracing::debug!("Liveness probe stopped");
        });

        Self {
            shutdown_token,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the task and wait for it to exit.
    pub async fn stop(mut self) {
        self.shutdown_token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Liveness probe task ended abnormally");
            }
        }
    }
}

impl Drop for LivenessProbe {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}
