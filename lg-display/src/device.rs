//! The display device
//!
//! `LgDisplay` is the public handle. It is cheap to clone; all clones drive
//! the same display. Internally every piece of mutable state lives in
//! `DeviceInner`:
//!
//! ```text
//! LgDisplay ──► Arc<DeviceInner>
//!                 ├── state: DisplayState        (belief about the display)
//!                 ├── sequencer: PowerSequencer  (deferred switching action)
//!                 ├── timers                     (warm-up / cool-down tasks)
//!                 ├── feedback: StateStore       (observable values)
//!                 ├── ramp: VolumeIncrementer
//!                 └── monitor: CommunicationMonitor
//! ```
//!
//! Commands go out through `send`, which serializes writes and inserts a
//! settle delay whenever a non-volume command follows a volume command.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lg_protocol::{Command, CommandKind, MagicPacket};
use parking_lot::Mutex;
use state_store::StateStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{DisplayConfig, ResolvedConfig};
use crate::error::{DisplayError, Result};
use crate::feedback::*;
use crate::inputs::{InputList, InputPort};
use crate::monitor::{CommunicationMonitor, MonitorStatus};
use crate::ramp::{RampDirection, RampSettings, VolumeIncrementer, VolumeTarget};
use crate::sequencer::{PowerSequencer, SwitchDecision};
use crate::state::{DisplayState, PowerState};
use crate::transport::{Transport, UdpWakeSender, WakeSender};

/// Pause inserted before a non-volume command that follows a volume command
pub const VOLUME_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Running warm-up or cool-down timer
///
/// `epoch` increments on every power transition so that a timer which fires
/// after being superseded can recognize itself as stale.
#[derive(Debug, Default)]
pub(crate) struct PowerTimers {
    pub(crate) epoch: u64,
    warm_up: Option<JoinHandle<()>>,
    cool_down: Option<JoinHandle<()>>,
}

impl PowerTimers {
    /// Cancel both timers and start a new epoch
    pub(crate) fn reset(&mut self) -> u64 {
        for handle in [self.warm_up.take(), self.cool_down.take()].into_iter().flatten() {
            handle.abort();
        }
        self.epoch += 1;
        self.epoch
    }

    pub(crate) fn arm_warm_up(&mut self, handle: JoinHandle<()>) {
        self.warm_up = Some(handle);
    }

    pub(crate) fn arm_cool_down(&mut self, handle: JoinHandle<()>) {
        self.cool_down = Some(handle);
    }
}

pub(crate) struct DeviceInner {
    pub(crate) config: ResolvedConfig,
    pub(crate) inputs: InputList,
    pub(crate) transport: Arc<dyn Transport>,
    wake_sender: Arc<dyn WakeSender>,
    /// Built once from the configured MAC address
    magic_packet: Option<MagicPacket>,
    pub(crate) state: Mutex<DisplayState>,
    pub(crate) sequencer: Mutex<PowerSequencer>,
    pub(crate) timers: Mutex<PowerTimers>,
    pub(crate) feedback: StateStore<FeedbackTarget>,
    pub(crate) ramp: VolumeIncrementer,
    pub(crate) monitor: CommunicationMonitor,
    /// Held while a frame is applied; taken before `state`
    pub(crate) dispatch_lock: Mutex<()>,
    /// Held for the duration of a write; the flag records whether the
    /// previous command was a volume command
    send_gate: tokio::sync::Mutex<bool>,
    pub(crate) status_task: Mutex<Option<JoinHandle<()>>>,
    pub(crate) receive_task: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceInner {
    fn new(
        config: ResolvedConfig,
        transport: Arc<dyn Transport>,
        wake_sender: Arc<dyn WakeSender>,
    ) -> Self {
        let inputs = InputList::default().with_friendly_names(&config.friendly_names);
        let (ramp_min, ramp_max) = config.volume_scale.ramp_bounds();
        let monitor = CommunicationMonitor::new(
            config.poll_interval,
            config.warning_threshold,
            config.error_threshold,
        );

        let magic_packet = config.mac_address.as_ref().map(MagicPacket::for_address);

        let inner = Self {
            magic_packet,
            state: Mutex::new(DisplayState::new(inputs.len())),
            sequencer: Mutex::new(PowerSequencer::new()),
            timers: Mutex::new(PowerTimers::default()),
            feedback: StateStore::new(),
            ramp: VolumeIncrementer::new(RampSettings::with_bounds(ramp_min, ramp_max)),
            monitor,
            send_gate: tokio::sync::Mutex::new(false),
            dispatch_lock: Mutex::new(()),
            status_task: Mutex::new(None),
            receive_task: Mutex::new(None),
            config,
            inputs,
            transport,
            wake_sender,
        };
        inner.init_feedback();
        inner
    }

    fn init_feedback(&self) {
        let device = FeedbackTarget::Device;
        self.feedback.set(&device, PowerOn(false));
        self.feedback.set(&device, WarmingUp(false));
        self.feedback.set(&device, CoolingDown(false));
        self.feedback.set(&device, Muted(false));
        self.feedback.set(&device, VideoMuted(false));
        self.feedback.set(&device, VolumeLevel(0));
        self.feedback.set(&device, CurrentInput(String::new()));
        self.feedback.set(&device, InputNumber(0));
        self.feedback.set(&device, CurrentItem(String::new()));
        self.feedback.set(&device, Online(false));
        self.feedback.set(&device, CommunicationStatus(MonitorStatus::Unknown));

        for (index, port) in self.inputs.iter().enumerate() {
            let target = FeedbackTarget::Input(index + 1);
            self.feedback.set(&target, InputSelected(false));
            self.feedback.set(&target, InputName(port.name.clone()));
        }
    }

    /// Write one command to the transport
    ///
    /// Writes are serialized in call order.
    pub(crate) async fn send(&self, command: Command) -> Result<()> {
        let mut previous_was_volume = self.send_gate.lock().await;
        if *previous_was_volume && !command.is_volume() {
            tokio::time::sleep(VOLUME_SETTLE_DELAY).await;
        }
        *previous_was_volume = command.is_volume();

        let line = command.encode(self.config.dialect);
        tracing::trace!("Sending {:?}", line);
        self.transport.send_line(&line).await?;
        Ok(())
    }

    pub(crate) async fn set_volume(&self, level: u16) -> Result<()> {
        self.state.lock().last_volume_sent = level;
        let percent = self.config.volume_scale.to_device(level);
        tracing::debug!("Setting volume {} ({}%)", level, percent);
        self.send(Command::volume(self.config.address, percent)).await
    }

    pub(crate) async fn power_on(self: &Arc<Self>) -> Result<()> {
        if self.transport.requires_polling() || self.config.override_wol {
            self.send(Command::power(self.config.address, true)).await?;
        } else {
            self.wake().await?;
        }
        self.apply_power(true);
        Ok(())
    }

    async fn wake(&self) -> Result<()> {
        let (Some(mac), Some(packet)) = (self.config.mac_address, self.magic_packet.as_ref()) else {
            return Err(DisplayError::Wake(
                "no MAC address configured for Wake-on-LAN".to_string(),
            ));
        };
        tracing::info!("Waking display at {}", mac);
        self.wake_sender
            .wake(packet)
            .await
            .map_err(|e| DisplayError::Wake(e.to_string()))
    }

    pub(crate) async fn execute_switch(self: &Arc<Self>, action: Command) -> Result<()> {
        let decision = {
            let state = self.state.lock();
            self.sequencer.lock().request(state.power_state(), action)
        };

        match decision {
            SwitchDecision::SendNow(command) => self.send(command).await,
            SwitchDecision::Deferred { power_on, replaced } => {
                if let Some(previous) = &replaced {
                    tracing::debug!("Deferred {:?} command replaced", previous.kind);
                }
                if power_on {
                    tracing::info!("Display is off; powering on before switching");
                    let result = self.power_on().await;
                    if result.is_err() {
                        tracing::debug!("Power-on failed; withdrawing deferred command");
                        self.sequencer.lock().restore(replaced);
                    }
                    result
                } else {
                    tracing::debug!("Display warming up; switching deferred");
                    Ok(())
                }
            }
        }
    }

    pub(crate) fn publish_monitor_status(&self, status: MonitorStatus) {
        match status {
            MonitorStatus::Ok => tracing::info!("Communication with display established"),
            MonitorStatus::InWarning => tracing::warn!("No response from display"),
            MonitorStatus::InError => tracing::error!("Communication with display lost"),
            MonitorStatus::Unknown => {}
        }
        self.feedback.set(&FeedbackTarget::Device, CommunicationStatus(status));
        self.feedback.set(&FeedbackTarget::Device, Online(status.is_online()));
    }

    fn refresh_feedback(&self) {
        let device = FeedbackTarget::Device;
        self.feedback.refresh::<PowerOn>(&device);
        self.feedback.refresh::<WarmingUp>(&device);
        self.feedback.refresh::<CoolingDown>(&device);
        self.feedback.refresh::<Muted>(&device);
        self.feedback.refresh::<VideoMuted>(&device);
        self.feedback.refresh::<VolumeLevel>(&device);
        self.feedback.refresh::<CurrentInput>(&device);
        self.feedback.refresh::<InputNumber>(&device);
        self.feedback.refresh::<CurrentItem>(&device);
        self.feedback.refresh::<Online>(&device);
        self.feedback.refresh::<CommunicationStatus>(&device);

        for number in 1..=self.inputs.len() {
            let target = FeedbackTarget::Input(number);
            self.feedback.refresh::<InputSelected>(&target);
            self.feedback.refresh::<InputName>(&target);
        }
    }

    fn shutdown(&self) {
        self.monitor.stop();
        self.ramp.stop();
        self.timers.lock().reset();
        for task in [&self.status_task, &self.receive_task] {
            if let Some(handle) = task.lock().take() {
                handle.abort();
            }
        }
    }
}

#[async_trait]
impl VolumeTarget for DeviceInner {
    fn current_level(&self) -> u16 {
        self.state.lock().last_volume_sent
    }

    async fn apply_level(&self, level: u16) {
        if let Err(e) = self.set_volume(level).await {
            tracing::error!("Volume ramp step failed: {}", e);
        }
    }
}

impl Drop for DeviceInner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Two-way driver for one LG display
///
/// # Example
///
/// ```rust,ignore
/// let config = DisplayConfig::from_json_str(r#"{ "id": "01" }"#)?;
/// let display = LgDisplay::from_config(&config, Arc::new(TcpTransport::serial_bridge("10.0.0.5:4001")))?;
/// display.activate().await?;
///
/// display.select_input(2).await?;   // powers on first if needed
/// display.set_volume(32768).await?;
///
/// for event in display.feedback().iter().try_iter() {
///     println!("{} changed", event.property_key);
/// }
/// ```
#[derive(Clone)]
pub struct LgDisplay {
    inner: Arc<DeviceInner>,
}

impl LgDisplay {
    /// Driver using UDP broadcast for Wake-on-LAN
    pub fn new(config: ResolvedConfig, transport: Arc<dyn Transport>) -> Self {
        Self::with_wake_sender(config, transport, Arc::new(UdpWakeSender::broadcast()))
    }

    pub fn with_wake_sender(
        config: ResolvedConfig,
        transport: Arc<dyn Transport>,
        wake_sender: Arc<dyn WakeSender>,
    ) -> Self {
        Self {
            inner: Arc::new(DeviceInner::new(config, transport, wake_sender)),
        }
    }

    /// Resolve a raw configuration and build the driver
    pub fn from_config(config: &DisplayConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self::new(config.resolve()?, transport))
    }

    /// Connect the transport and start receiving
    ///
    /// The communication monitor (periodic status polling) runs when the
    /// transport needs polling or `overrideWol` is set.
    pub async fn activate(&self) -> Result<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.spawn_receive_worker(rx);
        self.inner.transport.connect(tx).await?;

        if self.inner.transport.requires_polling() || self.inner.config.override_wol {
            self.inner.start_monitor();
        }
        tracing::info!("Display {} activated", self.inner.config.address);
        Ok(())
    }

    /// Stop polling, ramping, timers and the receive worker
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    // ------------------------------------------------------------------
    // Power
    // ------------------------------------------------------------------

    /// Power on by command (serial or `overrideWol`) or Wake-on-LAN
    ///
    /// Warm-up starts immediately; power feedback is not awaited.
    pub async fn power_on(&self) -> Result<()> {
        self.inner.power_on().await
    }

    /// Power off; state follows the display's acknowledgement
    pub async fn power_off(&self) -> Result<()> {
        self.inner
            .send(Command::power(self.inner.config.address, false))
            .await
    }

    pub async fn power_toggle(&self) -> Result<()> {
        let powered = self.inner.state.lock().power_on;
        if powered {
            self.power_off().await
        } else {
            self.power_on().await
        }
    }

    // ------------------------------------------------------------------
    // Volume and mute
    // ------------------------------------------------------------------

    /// Set volume on the external 0-65535 range
    pub async fn set_volume(&self, level: u16) -> Result<()> {
        self.inner.set_volume(level).await
    }

    /// Start ramping up on press, stop on release
    pub fn volume_up(&self, pressed: bool) {
        self.ramp(RampDirection::Up, pressed);
    }

    pub fn volume_down(&self, pressed: bool) {
        self.ramp(RampDirection::Down, pressed);
    }

    fn ramp(&self, direction: RampDirection, pressed: bool) {
        if pressed {
            let target: Arc<dyn VolumeTarget> = self.inner.clone();
            self.inner.ramp.start(direction, target);
        } else {
            self.inner.ramp.stop();
        }
    }

    pub async fn mute_on(&self) -> Result<()> {
        self.inner.send(Command::mute(self.inner.config.address, true)).await
    }

    pub async fn mute_off(&self) -> Result<()> {
        self.inner.send(Command::mute(self.inner.config.address, false)).await
    }

    pub async fn mute_toggle(&self) -> Result<()> {
        let muted = self.inner.state.lock().muted;
        self.inner.send(Command::mute(self.inner.config.address, !muted)).await
    }

    pub async fn video_mute_on(&self) -> Result<()> {
        self.inner
            .send(Command::video_mute(self.inner.config.address, true))
            .await
    }

    pub async fn video_mute_off(&self) -> Result<()> {
        self.inner
            .send(Command::video_mute(self.inner.config.address, false))
            .await
    }

    pub async fn video_mute_toggle(&self) -> Result<()> {
        let muted = self.inner.state.lock().video_muted;
        self.inner
            .send(Command::video_mute(self.inner.config.address, !muted))
            .await
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Select an input by 1-based number
    ///
    /// Powers the display on first when needed; the selection is sent once
    /// warm-up completes.
    pub async fn select_input(&self, number: usize) -> Result<()> {
        let available = self.inner.inputs.len();
        let Some(port) = self.inner.inputs.get(number) else {
            tracing::error!("Input {} is out of range (1-{})", number, available);
            return Err(DisplayError::OutOfRangeSelection {
                requested: number,
                available,
            });
        };
        self.switch_to(port).await
    }

    /// Select an input by key (`hdmiIn2`) or selector code (`91`)
    pub async fn select_input_key(&self, key: &str) -> Result<()> {
        let port = self
            .inner
            .inputs
            .find(key)
            .and_then(|index| self.inner.inputs.get(index + 1))
            .ok_or_else(|| {
                tracing::error!("No selectable input '{}'", key);
                DisplayError::InputNotFound(key.to_string())
            })?;
        self.switch_to(port).await
    }

    async fn switch_to(&self, port: &InputPort) -> Result<()> {
        tracing::debug!("Selecting input {} ({})", port.key, port.name);
        self.execute_switch(Command::select_input(self.inner.config.address, port.code.clone()))
            .await
    }

    /// Run a switching command, powering on and deferring it when needed
    pub async fn execute_switch(&self, action: Command) -> Result<()> {
        self.inner.execute_switch(action).await
    }

    // ------------------------------------------------------------------
    // Status queries
    // ------------------------------------------------------------------

    pub async fn power_get(&self) -> Result<()> {
        self.poll(CommandKind::Power).await
    }

    pub async fn input_get(&self) -> Result<()> {
        self.poll(CommandKind::Input).await
    }

    pub async fn volume_get(&self) -> Result<()> {
        self.poll(CommandKind::Volume).await
    }

    pub async fn mute_get(&self) -> Result<()> {
        self.poll(CommandKind::Mute).await
    }

    pub async fn video_mute_get(&self) -> Result<()> {
        self.poll(CommandKind::VideoMute).await
    }

    async fn poll(&self, kind: CommandKind) -> Result<()> {
        self.inner
            .send(Command::poll(kind, self.inner.config.address))
            .await
    }

    /// Query power, input, volume and mute in turn, spaced apart
    ///
    /// Runs in the background. A request made while a sequence is still
    /// running is ignored.
    pub fn status_get(&self) {
        self.inner.start_status_sequence();
    }

    // ------------------------------------------------------------------
    // Receive side and feedback
    // ------------------------------------------------------------------

    /// Process one complete response frame
    ///
    /// Frames are applied one at a time, whether they arrive here or
    /// through the transport's receive worker.
    pub fn process_response(&self, frame: &str) {
        self.inner.dispatch(frame);
    }

    /// Re-notify every feedback value, e.g. after a surface reconnects
    pub fn refresh_feedback(&self) {
        self.inner.refresh_feedback();
    }

    pub fn feedback(&self) -> &StateStore<FeedbackTarget> {
        &self.inner.feedback
    }

    /// Snapshot of the current device state
    pub fn state(&self) -> DisplayState {
        self.inner.state.lock().clone()
    }

    pub fn power_state(&self) -> PowerState {
        self.inner.state.lock().power_state()
    }

    /// Action waiting for warm-up to complete
    pub fn pending_switch(&self) -> Option<Command> {
        self.inner.sequencer.lock().pending().cloned()
    }

    pub fn is_ramping(&self) -> bool {
        self.inner.ramp.is_active()
    }

    pub fn communication_status(&self) -> MonitorStatus {
        self.inner.monitor.status()
    }

    pub fn inputs(&self) -> &InputList {
        &self.inner.inputs
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for LgDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LgDisplay")
            .field("address", &self.inner.config.address)
            .field("power_state", &self.power_state())
            .finish()
    }
}
