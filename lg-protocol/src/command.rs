//! Outbound command encoding
//!
//! Commands are single ASCII lines of the form
//!
//! ```text
//! <group><letter> <id> <payload>\r
//! ```
//!
//! where `<group>` is `k` for control and status queries or `x` for input
//! selection, and `<letter>` identifies the function. The device echoes only
//! `<letter>` in its acknowledgement, which is how responses are routed.

use crate::address::DeviceAddress;

/// Line terminator expected by the device
pub const TERMINATOR: char = '\r';

/// Payload token that asks the device to report its current value
pub const POLL_TOKEN: &str = "FF";

/// Function addressed by a command or reported by a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Power,
    Input,
    Volume,
    Mute,
    VideoMute,
}

impl CommandKind {
    /// Letter echoed by the device in responses
    pub fn letter(&self) -> char {
        match self {
            CommandKind::Power => 'a',
            CommandKind::Input => 'b',
            CommandKind::Volume => 'f',
            CommandKind::Mute => 'e',
            CommandKind::VideoMute => 'd',
        }
    }

    /// Look up a kind from a response's command token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "a" => Some(CommandKind::Power),
            "b" => Some(CommandKind::Input),
            "f" => Some(CommandKind::Volume),
            "e" => Some(CommandKind::Mute),
            "d" => Some(CommandKind::VideoMute),
            _ => None,
        }
    }
}

/// Protocol dialect spoken by a particular display
///
/// Smaller panels expect one-character on/off payloads (`0`/`1`) where the
/// larger ones expect two (`00`/`01`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Standard,
    SmallDisplay,
}

impl Dialect {
    pub fn from_small_display(small_display: bool) -> Self {
        if small_display {
            Dialect::SmallDisplay
        } else {
            Dialect::Standard
        }
    }
}

/// Command payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Status query (`FF`)
    Poll,
    /// Binary switch token; rendered per dialect
    Switch(bool),
    /// Volume percentage, rendered as zero-padded decimal
    Level(u8),
    /// Literal hex code such as an input selector
    Code(String),
}

impl Payload {
    pub fn render(&self, dialect: Dialect) -> String {
        match (self, dialect) {
            (Payload::Poll, _) => POLL_TOKEN.to_string(),
            (Payload::Switch(true), Dialect::Standard) => "01".to_string(),
            (Payload::Switch(false), Dialect::Standard) => "00".to_string(),
            (Payload::Switch(true), Dialect::SmallDisplay) => "1".to_string(),
            (Payload::Switch(false), Dialect::SmallDisplay) => "0".to_string(),
            (Payload::Level(level), _) => format!("{:02}", level),
            (Payload::Code(code), _) => code.to_ascii_uppercase(),
        }
    }
}

/// An outbound directive to one display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub address: DeviceAddress,
    pub payload: Payload,
}

impl Command {
    pub fn new(kind: CommandKind, address: DeviceAddress, payload: Payload) -> Self {
        Self {
            kind,
            address,
            payload,
        }
    }

    /// Status query for the given function
    pub fn poll(kind: CommandKind, address: DeviceAddress) -> Self {
        Self::new(kind, address, Payload::Poll)
    }

    pub fn power(address: DeviceAddress, on: bool) -> Self {
        Self::new(CommandKind::Power, address, Payload::Switch(on))
    }

    /// Audio mute. The device encodes "muted" as `00`.
    pub fn mute(address: DeviceAddress, muted: bool) -> Self {
        Self::new(CommandKind::Mute, address, Payload::Switch(!muted))
    }

    /// Screen mute. Unlike audio mute, "muted" is `01`.
    pub fn video_mute(address: DeviceAddress, muted: bool) -> Self {
        Self::new(CommandKind::VideoMute, address, Payload::Switch(muted))
    }

    /// Volume in device percent; values above 100 are clamped
    pub fn volume(address: DeviceAddress, percent: u8) -> Self {
        Self::new(CommandKind::Volume, address, Payload::Level(percent.min(100)))
    }

    pub fn select_input(address: DeviceAddress, code: impl Into<String>) -> Self {
        Self::new(CommandKind::Input, address, Payload::Code(code.into()))
    }

    pub fn is_poll(&self) -> bool {
        self.payload == Payload::Poll
    }

    pub fn is_volume(&self) -> bool {
        self.kind == CommandKind::Volume
    }

    /// Two-character command prefix
    pub fn prefix(&self) -> String {
        let group = match (self.kind, self.is_poll()) {
            (CommandKind::Input, false) => 'x',
            _ => 'k',
        };
        format!("{}{}", group, self.kind.letter())
    }

    /// Render the command line without the terminator
    pub fn to_line(&self, dialect: Dialect) -> String {
        format!(
            "{} {} {}",
            self.prefix(),
            self.address,
            self.payload.render(dialect)
        )
    }

    /// Render the full wire frame including the carriage return
    pub fn encode(&self, dialect: Dialect) -> String {
        let mut line = self.to_line(dialect);
        line.push(TERMINATOR);
        line
    }
}
