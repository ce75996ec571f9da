//! Inbound response decoding
//!
//! Acknowledgements look like `a 01 OK01x`: the command letter, the ID of
//! the answering unit, then the value with an in-band `OK` marker and a
//! trailing `x` filler. Negative acknowledgements carry `NG` instead and are
//! rejected before any tokenizing happens.

use crate::address::DeviceAddress;
use crate::command::CommandKind;
use crate::error::{ProtocolError, Result};

const ACK_MARKER: &str = "OK";
const NAK_MARKER: &str = "ng";
const FILLER: [char; 2] = ['x', 'X'];

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Raw command token (normally a single letter)
    pub command: String,
    /// Raw device ID token as sent by the display
    pub address: String,
    /// Value with acknowledgement marker and filler removed
    pub value: String,
}

impl Response {
    /// Decode a single line received from the display
    ///
    /// # Example
    ///
    /// ```rust
    /// use lg_protocol::{CommandKind, Response};
    ///
    /// let response = Response::decode("a 1 OK01x").unwrap();
    /// assert_eq!(response.kind(), Some(CommandKind::Power));
    /// assert_eq!(response.value, "01");
    /// ```
    pub fn decode(raw: &str) -> Result<Self> {
        if raw.to_ascii_lowercase().contains(NAK_MARKER) {
            return Err(ProtocolError::NegativeAcknowledgement(raw.to_string()));
        }

        let stripped = raw.trim().replace(ACK_MARKER, "");
        let tokens: Vec<&str> = stripped.split(' ').collect();
        if tokens.len() < 3 {
            return Err(ProtocolError::MalformedFrame(raw.to_string()));
        }

        Ok(Self {
            command: tokens[0].to_string(),
            address: tokens[1].to_string(),
            value: tokens[2].trim_end_matches(FILLER).to_string(),
        })
    }

    /// Function this response reports on, if recognized
    pub fn kind(&self) -> Option<CommandKind> {
        CommandKind::from_token(&self.command)
    }

    /// Whether the response came from the given unit
    pub fn is_from(&self, address: DeviceAddress) -> bool {
        address.matches_token(&self.address)
    }
}

/// Parse a two-digit hex payload (volume reports)
pub fn parse_hex(value: &str) -> Result<u16> {
    u16::from_str_radix(value.trim(), 16).map_err(|_| ProtocolError::ValueParse {
        value: value.to_string(),
        expected: "hex integer",
    })
}

/// Parse a decimal payload (mute and screen-mute reports)
pub fn parse_int(value: &str) -> Result<i32> {
    value.trim().parse::<i32>().map_err(|_| ProtocolError::ValueParse {
        value: value.to_string(),
        expected: "decimal integer",
    })
}
