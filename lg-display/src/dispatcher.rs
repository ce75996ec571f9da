//! Response dispatch
//!
//! A single worker task owns the receive side: it frames raw transport text
//! and hands each frame to `dispatch`. Frames are applied under the
//! dispatch lock, so updaters never run concurrently with each other even
//! when frames are also fed in directly.

use std::sync::Arc;

use lg_protocol::{CommandKind, ProtocolError, Response, ResponseFramer};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::device::DeviceInner;

impl DeviceInner {
    /// Decode one frame and route it to its updater
    ///
    /// Negative acknowledgements, malformed frames and frames from other
    /// units on the bus are dropped.
    pub(crate) fn dispatch(self: &Arc<Self>, frame: &str) {
        let response = match Response::decode(frame) {
            Ok(response) => response,
            Err(ProtocolError::NegativeAcknowledgement(raw)) => {
                tracing::debug!("Display rejected command: {:?}", raw);
                return;
            }
            Err(e) => {
                tracing::debug!("Dropping frame: {}", e);
                return;
            }
        };

        if !response.is_from(self.config.address) {
            tracing::trace!(
                "Ignoring response from unit {:?} (expecting {})",
                response.address,
                self.config.address
            );
            return;
        }

        let _applying = self.dispatch_lock.lock();
        match response.kind() {
            Some(CommandKind::Power) => self.apply_power(response.value.contains('1')),
            Some(CommandKind::Input) => self.apply_input(&response.value),
            Some(CommandKind::Volume) => self.apply_volume(&response.value),
            Some(CommandKind::Mute) => self.apply_mute(&response.value),
            Some(CommandKind::VideoMute) => self.apply_video_mute(&response.value),
            None => tracing::trace!("Unhandled response {:?}", response.command),
        }
    }

    /// Record proof of life for the communication monitor
    pub(crate) fn note_activity(&self) {
        if let Some(status) = self.monitor.record_activity(Instant::now()) {
            self.publish_monitor_status(status);
        }
    }

    /// Start the worker consuming text from the transport
    ///
    /// The worker holds only a weak reference and ends once the device is
    /// dropped or the channel closes. A previous worker is replaced.
    pub(crate) fn spawn_receive_worker(self: &Arc<Self>, mut received: mpsc::UnboundedReceiver<String>) {
        let device = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut framer = ResponseFramer::new();
            while let Some(chunk) = received.recv().await {
                let Some(inner) = device.upgrade() else {
                    break;
                };
                inner.note_activity();
                for frame in framer.push(&chunk) {
                    tracing::trace!("Received {:?}", frame);
                    inner.dispatch(&frame);
                }
            }
            tracing::debug!("Receive worker stopped");
        });

        if let Some(previous) = self.receive_task.lock().replace(handle) {
            previous.abort();
        }
    }
}
