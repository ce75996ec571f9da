//! Communication health monitoring
//!
//! Transports that cannot report link state on their own (RS-232) are
//! polled on a fixed interval. Any received text counts as proof of life;
//! the monitor classifies how long the line has been silent.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Health of the link to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MonitorStatus {
    /// Nothing received yet
    #[default]
    Unknown,
    Ok,
    /// Silent for longer than the warning threshold
    InWarning,
    /// Silent for longer than the error threshold
    InError,
}

impl MonitorStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, MonitorStatus::Ok | MonitorStatus::InWarning)
    }

    /// Classify a period of silence against the two thresholds
    pub fn for_silence(silence: Duration, warning: Duration, error: Duration) -> Self {
        if silence >= error {
            MonitorStatus::InError
        } else if silence >= warning {
            MonitorStatus::InWarning
        } else {
            MonitorStatus::Ok
        }
    }
}

#[derive(Debug, Default)]
struct MonitorState {
    started_at: Option<Instant>,
    last_activity: Option<Instant>,
    status: MonitorStatus,
}

/// Periodic poller plus silence classifier
#[derive(Debug)]
pub struct CommunicationMonitor {
    poll_interval: Duration,
    warning_threshold: Duration,
    error_threshold: Duration,
    state: Mutex<MonitorState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CommunicationMonitor {
    pub fn new(poll_interval: Duration, warning_threshold: Duration, error_threshold: Duration) -> Self {
        Self {
            poll_interval,
            warning_threshold,
            error_threshold,
            state: Mutex::new(MonitorState::default()),
            task: Mutex::new(None),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn status(&self) -> MonitorStatus {
        self.state.lock().status
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Note received text; returns the new status if it changed
    pub fn record_activity(&self, now: Instant) -> Option<MonitorStatus> {
        self.state.lock().last_activity = Some(now);
        self.evaluate(now)
    }

    /// Re-classify the current silence; returns the new status if it changed
    ///
    /// Silence is measured from the last activity, or from `start` when
    /// nothing has been received yet. A display that has never answered
    /// stays `Unknown` until the error threshold passes.
    pub fn evaluate(&self, now: Instant) -> Option<MonitorStatus> {
        let mut state = self.state.lock();
        let reference = state.last_activity.or(state.started_at)?;

        let silence = now.saturating_duration_since(reference);
        let mut status = MonitorStatus::for_silence(silence, self.warning_threshold, self.error_threshold);
        if state.last_activity.is_none() && status != MonitorStatus::InError {
            status = MonitorStatus::Unknown;
        }

        if status == state.status {
            return None;
        }
        tracing::debug!("Communication status {:?} -> {:?}", state.status, status);
        state.status = status;
        Some(status)
    }

    /// Run `tick` immediately and then once per poll interval
    ///
    /// The loop ends when `tick` returns `false` or `stop` is called. A
    /// running loop is replaced.
    pub fn start<F, Fut>(&self, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.stop();
        self.state.lock().started_at = Some(Instant::now());

        let interval = self.poll_interval;
        let handle = tokio::spawn(async move {
            loop {
                if !tick().await {
                    tracing::debug!("Communication monitor loop ending");
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        });
        *self.task.lock() = Some(handle);
    }

    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for CommunicationMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
