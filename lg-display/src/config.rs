//! Configuration for an LG display
//!
//! `DisplayConfig` mirrors the JSON properties block a host hands the driver
//! (camelCase keys, every field optional). `resolve` validates it and fills
//! in defaults, producing the `ResolvedConfig` the driver actually runs on.

use std::time::Duration;

use lg_protocol::{DeviceAddress, Dialect, MacAddress};
use serde::{Deserialize, Serialize};

use crate::error::{DisplayError, Result};
use crate::scaling::VolumeScale;

/// Status poll interval when none (or too small a one) is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10_000);

/// Smallest accepted poll interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(2_000);

pub const DEFAULT_WARM_UP: Duration = Duration::from_millis(10_000);

pub const DEFAULT_COOL_DOWN: Duration = Duration::from_millis(8_000);

/// Silence after which communication is reported as degraded
pub const WARNING_THRESHOLD: Duration = Duration::from_secs(180);

/// Silence after which communication is reported as lost
pub const ERROR_THRESHOLD: Duration = Duration::from_secs(300);

/// Rename or hide one of the display's inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FriendlyName {
    /// Input key (`hdmiIn1`) or selector code (`90`)
    pub input_key: String,
    pub name: String,
    pub hide_input: bool,
}

impl FriendlyName {
    pub fn new(input_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            input_key: input_key.into(),
            name: name.into(),
            hide_input: false,
        }
    }

    pub fn hidden(input_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hide_input: true,
            ..Self::new(input_key, name)
        }
    }

    /// Entries with an empty key or name are ignored
    pub fn is_valid(&self) -> bool {
        !self.input_key.trim().is_empty() && !self.name.trim().is_empty()
    }
}

/// Raw device configuration as supplied by the host
///
/// # Example
///
/// ```rust
/// use lg_display::DisplayConfig;
///
/// let config = DisplayConfig::from_json_str(r#"{ "id": "01", "smallDisplay": true }"#).unwrap();
/// let resolved = config.resolve().unwrap();
/// assert_eq!(resolved.address.to_string(), "01");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayConfig {
    /// Set ID of the display on the bus; defaults to 1
    pub id: Option<String>,

    /// Upper volume limit in percent
    /// Scaling is active only when greater than `volume_lower_limit`
    pub volume_upper_limit: i32,

    pub volume_lower_limit: i32,

    /// Status poll interval in milliseconds
    /// Default: 10000; values below 2000 fall back to the default
    pub poll_interval_ms: i64,

    /// Default: 8000 when zero or negative
    pub cooling_time_ms: i64,

    /// Default: 10000 when zero or negative
    pub warming_time_ms: i64,

    /// Target for Wake-on-LAN power-on
    pub mac_address: Option<String>,

    /// Use one-character on/off payloads
    pub small_display: bool,

    /// Send power-on as a command even over a network transport
    pub override_wol: bool,

    pub friendly_names: Vec<FriendlyName>,
}

impl DisplayConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Validate and apply defaults
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let address = match self.id.as_deref().map(str::trim) {
            None | Some("") => DeviceAddress::DEFAULT,
            Some(id) => DeviceAddress::parse(id)?,
        };

        let volume_scale = VolumeScale::new(
            percent_limit(self.volume_lower_limit, "volumeLowerLimit")?,
            percent_limit(self.volume_upper_limit, "volumeUpperLimit")?,
        );

        let poll_interval = match u64::try_from(self.poll_interval_ms) {
            Ok(ms) if Duration::from_millis(ms) >= MIN_POLL_INTERVAL => Duration::from_millis(ms),
            _ => DEFAULT_POLL_INTERVAL,
        };

        let mac_address = match self.mac_address.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(mac) => Some(MacAddress::parse(mac)?),
        };

        let friendly_names = self
            .friendly_names
            .iter()
            .filter(|entry| {
                if !entry.is_valid() {
                    tracing::debug!("Ignoring friendly name entry {:?}", entry);
                }
                entry.is_valid()
            })
            .cloned()
            .collect();

        Ok(ResolvedConfig {
            address,
            dialect: Dialect::from_small_display(self.small_display),
            volume_scale,
            poll_interval,
            warm_up: duration_or(self.warming_time_ms, DEFAULT_WARM_UP),
            cool_down: duration_or(self.cooling_time_ms, DEFAULT_COOL_DOWN),
            warning_threshold: WARNING_THRESHOLD,
            error_threshold: ERROR_THRESHOLD,
            mac_address,
            override_wol: self.override_wol,
            friendly_names,
        })
    }
}

fn percent_limit(value: i32, field: &str) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|percent| *percent <= 100)
        .ok_or_else(|| DisplayError::Config(format!("{} must be 0-100, got {}", field, value)))
}

fn duration_or(ms: i64, default: Duration) -> Duration {
    match u64::try_from(ms) {
        Ok(ms) if ms > 0 => Duration::from_millis(ms),
        _ => default,
    }
}

/// Validated configuration with every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub address: DeviceAddress,
    pub dialect: Dialect,
    pub volume_scale: VolumeScale,
    pub poll_interval: Duration,
    pub warm_up: Duration,
    pub cool_down: Duration,
    pub warning_threshold: Duration,
    pub error_threshold: Duration,
    pub mac_address: Option<MacAddress>,
    pub override_wol: bool,
    /// Valid entries only, in configuration order
    pub friendly_names: Vec<FriendlyName>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            address: DeviceAddress::DEFAULT,
            dialect: Dialect::Standard,
            volume_scale: VolumeScale::unscaled(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            warm_up: DEFAULT_WARM_UP,
            cool_down: DEFAULT_COOL_DOWN,
            warning_threshold: WARNING_THRESHOLD,
            error_threshold: ERROR_THRESHOLD,
            mac_address: None,
            override_wol: false,
            friendly_names: Vec::new(),
        }
    }
}
