//! State updaters
//!
//! One updater per response kind. Each mutates `DisplayState` under the
//! lock, releases it, and then publishes the affected feedback values.
//! Unparseable values are logged and leave state untouched.

use std::sync::Arc;

use lg_protocol::{parse_hex, parse_int};

use crate::device::DeviceInner;
use crate::feedback::*;

impl DeviceInner {
    /// Power report or optimistic power-on
    ///
    /// Only transitions do anything. Turning on starts warm-up and cancels
    /// any cool-down; turning off starts cool-down, cancels warm-up and
    /// drops the deferred switching action.
    pub(crate) fn apply_power(self: &Arc<Self>, on: bool) {
        let snapshot = {
            let mut state = self.state.lock();
            if state.power_on == on {
                return;
            }
            state.power_on = on;
            state.warming_up = on;
            state.cooling_down = !on;

            let mut timers = self.timers.lock();
            let epoch = timers.reset();
            let inner = Arc::clone(self);
            if on {
                let delay = self.config.warm_up;
                timers.arm_warm_up(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    inner.finish_warm_up(epoch).await;
                }));
            } else {
                self.sequencer.lock().discard();
                let delay = self.config.cool_down;
                timers.arm_cool_down(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    inner.finish_cool_down(epoch);
                }));
            }
            (state.power_on, state.warming_up, state.cooling_down)
        };

        tracing::info!("Display power {}", if on { "on" } else { "off" });
        let device = FeedbackTarget::Device;
        self.feedback.set(&device, PowerOn(snapshot.0));
        self.feedback.set(&device, WarmingUp(snapshot.1));
        self.feedback.set(&device, CoolingDown(snapshot.2));
    }

    /// Warm-up timer expired: clear the flag and run the deferred action
    pub(crate) async fn finish_warm_up(&self, epoch: u64) {
        let pending = {
            let mut state = self.state.lock();
            if !state.warming_up || self.timers.lock().epoch != epoch {
                return;
            }
            state.warming_up = false;
            self.sequencer.lock().take_pending()
        };

        tracing::info!("Display warm-up complete");
        self.feedback.set(&FeedbackTarget::Device, WarmingUp(false));

        if let Some(command) = pending {
            tracing::debug!("Running deferred {:?} command", command.kind);
            if let Err(e) = self.send(command).await {
                tracing::error!("Deferred command failed: {}", e);
            }
        }
    }

    pub(crate) fn finish_cool_down(&self, epoch: u64) {
        {
            let mut state = self.state.lock();
            if !state.cooling_down || self.timers.lock().epoch != epoch {
                return;
            }
            state.cooling_down = false;
        }

        tracing::info!("Display cool-down complete");
        self.feedback.set(&FeedbackTarget::Device, CoolingDown(false));
    }

    /// Input report: match the token against the input list
    ///
    /// The raw token is always recorded. Selection feedback is published
    /// for every input when the selection changes.
    pub(crate) fn apply_input(&self, token: &str) {
        let token = token.trim().to_string();
        let position = self.inputs.position_by_token(&token);

        let changed = {
            let mut state = self.state.lock();
            state.current_item = Some(token.clone());
            match position {
                Some(index) => state.select_input(index),
                None => false,
            }
        };

        let device = FeedbackTarget::Device;
        self.feedback.set(&device, CurrentItem(token.clone()));

        let Some(index) = position else {
            tracing::debug!("Input report '{}' matches no selectable input", token);
            return;
        };
        if !changed {
            return;
        }

        let number = index + 1;
        if let Some(port) = self.inputs.get(number) {
            tracing::info!("Input changed to {} ({})", port.key, port.name);
            self.feedback.set(&device, CurrentInput(port.key.clone()));
        }
        self.feedback
            .set(&device, InputNumber(u16::try_from(number).unwrap_or(u16::MAX)));
        for other in 1..=self.inputs.len() {
            self.feedback
                .publish(&FeedbackTarget::Input(other), InputSelected(other == number));
        }
    }

    /// Volume report in hex percent
    ///
    /// While a ramp is running the ramp owns `last_volume_sent`; feedback
    /// only updates the displayed level.
    pub(crate) fn apply_volume(&self, value: &str) {
        let device_volume = match parse_hex(value) {
            Ok(volume) => volume,
            Err(e) => {
                tracing::warn!("Ignoring volume report: {}", e);
                return;
            }
        };

        let level = self.config.volume_scale.to_external(device_volume);
        let ramping = self.ramp.is_active();
        {
            let mut state = self.state.lock();
            state.volume = level;
            if !ramping {
                state.last_volume_sent = level;
            }
        }

        tracing::debug!("Volume reported {} ({}%)", level, device_volume);
        self.feedback.set(&FeedbackTarget::Device, VolumeLevel(level));
    }

    /// Audio mute report; the device reports "muted" as 0
    pub(crate) fn apply_mute(&self, value: &str) {
        let muted = match parse_int(value) {
            Ok(0) => true,
            Ok(1) => false,
            Ok(other) => {
                tracing::debug!("Ignoring mute report {}", other);
                return;
            }
            Err(e) => {
                tracing::warn!("Ignoring mute report: {}", e);
                return;
            }
        };

        self.state.lock().muted = muted;
        self.feedback.set(&FeedbackTarget::Device, Muted(muted));
    }

    /// Screen mute report; "muted" is 1
    pub(crate) fn apply_video_mute(&self, value: &str) {
        let muted = match parse_int(value) {
            Ok(0) => false,
            Ok(1) => true,
            Ok(other) => {
                tracing::debug!("Ignoring video mute report {}", other);
                return;
            }
            Err(e) => {
                tracing::warn!("Ignoring video mute report: {}", e);
                return;
            }
        };

        self.state.lock().video_muted = muted;
        self.feedback.set(&FeedbackTarget::Device, VideoMuted(muted));
    }
}
