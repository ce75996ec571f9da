//! Device addressing
//!
//! Every unit on a daisy-chained RS-232 bus answers to a numeric set ID.
//! The device is inconsistent about how it renders that ID: a unit
//! configured as `01` may answer with `1`. Addresses are therefore stored
//! as integers and compared by value.

use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, Result};

/// Normalized device set ID
///
/// # Example
///
/// ```rust
/// use lg_protocol::DeviceAddress;
///
/// let configured: DeviceAddress = "01".parse().unwrap();
/// assert!(configured.matches_token("1"));
/// assert_eq!(configured.to_string(), "01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceAddress(u16);

impl DeviceAddress {
    /// Address used when configuration does not supply one
    pub const DEFAULT: DeviceAddress = DeviceAddress(1);

    pub fn new(id: u16) -> Self {
        Self(id)
    }

    /// Parse a protocol token such as `"1"` or `"01"`
    pub fn parse(token: &str) -> Result<Self> {
        token
            .trim()
            .parse::<u16>()
            .map(Self)
            .map_err(|_| ProtocolError::InvalidDeviceAddress(token.to_string()))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Whether a raw ID token from a response refers to this address
    ///
    /// Tokens that are not integers never match.
    pub fn matches_token(&self, token: &str) -> bool {
        Self::parse(token).map(|other| other == *self).unwrap_or(false)
    }
}

impl Default for DeviceAddress {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for DeviceAddress {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
