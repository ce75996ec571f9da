//! # lg-display
//!
//! Two-way control driver for LG commercial displays over their RS-232 /
//! network control protocol.
//!
//! The driver sends power, input, volume, mute and screen-mute commands,
//! keeps a model of the display's state from its acknowledgements, and
//! publishes that state as observable feedback.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lg_display::{DisplayConfig, LgDisplay, TcpTransport};
//!
//! #[tokio::main]
//! async fn main() -> lg_display::Result<()> {
//!     lg_display::logging::init_logging_from_env().ok();
//!
//!     let config = DisplayConfig::from_json_str(r#"{ "id": "01", "overrideWol": true }"#)?;
//!     let display = LgDisplay::from_config(&config, Arc::new(TcpTransport::new("10.0.0.20:9761")))?;
//!     display.activate().await?;
//!
//!     display.select_input_key("hdmiIn2").await?;
//!     display.set_volume(20_000).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!  public API ──► sequencer ──► send ──► Transport ──► display
//!                                                        │
//!  feedback ◄── updaters ◄── dispatch ◄── ResponseFramer ◄┘
//!      ▲                                      │
//!      └──── monitor (poll + link health) ────┘
//! ```
//!
//! - `lg-protocol` encodes commands and decodes responses
//! - `state-store` holds the published feedback values
//! - this crate owns timing: warm-up and cool-down, deferred switching,
//!   volume ramping and status polling

pub mod config;
pub mod device;
pub mod error;
pub mod feedback;
pub mod inputs;
pub mod logging;
pub mod monitor;
pub mod poll;
pub mod ramp;
pub mod scaling;
pub mod sequencer;
pub mod state;
pub mod transport;

mod dispatcher;
mod updaters;

pub use config::{DisplayConfig, FriendlyName, ResolvedConfig};
pub use device::{LgDisplay, VOLUME_SETTLE_DELAY};
pub use error::{DisplayError, Result};
pub use feedback::{FeedbackProperty, FeedbackTarget, Property, Scope};
pub use inputs::{ConnectionKind, InputList, InputPort, SignalType};
pub use monitor::{CommunicationMonitor, MonitorStatus};
pub use ramp::{RampDirection, RampSettings, VolumeIncrementer, VolumeTarget};
pub use scaling::VolumeScale;
pub use sequencer::{PowerSequencer, SwitchDecision};
pub use state::{DisplayState, PowerState};
pub use transport::{TcpTransport, Transport, TransportError, UdpWakeSender, WakeSender};

pub use lg_protocol::{Command, CommandKind, DeviceAddress, Dialect, MacAddress};
pub use state_store::{ChangeEvent, ChangeKind, StateStore};
