use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use super::core::{Resume, SchedulerCore};

/// Drives a [`SchedulerCore`] with real timers.
///
/// The loop re-reads persisted state before arming every wait, so a stop
/// or start written by another process takes effect within one cycle.
/// While the schedule is disabled, or while another agent drives, the
/// loop idles at `idle_poll` granularity instead of arming a deadline.
pub struct SchedulerRunner {
    core: SchedulerCore,
    idle_poll: Duration,
    cancel: Arc<Notify>,
}

impl SchedulerRunner {
    pub fn new(core: SchedulerCore, idle_poll: Duration) -> Self {
        Self {
            core,
            idle_poll,
            cancel: Arc::new(Notify::new()),
        }
    }

    /// Handle for cancelling the pending wait and stopping the loop.
    pub fn cancel_handle(&self) -> Arc<Notify> {
        self.cancel.clone()
    }

    pub async fn run(mut self) {
        loop {
            let wait = match self.core.resume().await {
                Resume::Wait(remaining) => remaining,
                // Idle, suspended or freshly fired: poll again shortly.
                Resume::Idle | Resume::Fired(_) => self.idle_poll,
            };

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.cancel.notified() => break,
            }
        }
        log::debug!("scheduler runner stopped");
    }
}
