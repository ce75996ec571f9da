//! Status polling
//!
//! The display only speaks when spoken to, so state is refreshed by querying
//! each function in turn. Queries are spaced out because the display drops
//! commands that arrive while it is still answering the previous one.

use std::sync::Arc;
use std::time::Duration;

use lg_protocol::{Command, CommandKind};
use tokio::time::Instant;

use crate::device::DeviceInner;

/// Functions queried by a status sequence, in order
pub const STATUS_SEQUENCE: [CommandKind; 4] = [
    CommandKind::Power,
    CommandKind::Input,
    CommandKind::Volume,
    CommandKind::Mute,
];

/// Gap between consecutive queries of a status sequence
pub const STATUS_QUERY_SPACING: Duration = Duration::from_millis(1500);

impl DeviceInner {
    /// Start a status sequence in the background unless one is running
    pub(crate) fn start_status_sequence(self: &Arc<Self>) {
        let mut task = self.status_task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::debug!("Status sequence already running");
            return;
        }

        let inner = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            inner.run_status_sequence().await;
        }));
    }

    async fn run_status_sequence(&self) {
        for (step, kind) in STATUS_SEQUENCE.iter().enumerate() {
            if step > 0 {
                tokio::time::sleep(STATUS_QUERY_SPACING).await;
            }
            if let Err(e) = self.send(Command::poll(*kind, self.config.address)).await {
                tracing::warn!("{:?} status query failed: {}", kind, e);
            }
        }
    }

    /// Poll status on every monitor interval and re-classify link health
    pub(crate) fn start_monitor(self: &Arc<Self>) {
        let device = Arc::downgrade(self);
        tracing::debug!(
            "Starting communication monitor every {:?}",
            self.monitor.poll_interval()
        );

        self.monitor.start(move || {
            let device = device.clone();
            async move {
                let Some(inner) = device.upgrade() else {
                    return false;
                };
                inner.start_status_sequence();
                if let Some(status) = inner.monitor.evaluate(Instant::now()) {
                    inner.publish_monitor_status(status);
                }
                true
            }
        });
    }
}
