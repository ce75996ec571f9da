//! Wake-on-LAN support
//!
//! Displays controlled over the network cannot be addressed while they are
//! in standby, so power-on goes out as a magic packet instead: six `0xFF`
//! bytes followed by sixteen copies of the target MAC address.

use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, Result};

/// Length of a magic packet in bytes
pub const MAGIC_PACKET_LEN: usize = 6 + 16 * 6;

/// Hardware address of the display's network interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Parse a MAC address
    ///
    /// Accepts six hex pairs separated by `:`, `-` or `.`, or twelve bare
    /// hex digits. Anything else is rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || ProtocolError::InvalidMacAddress(s.to_string());

        let digits: String = match s.len() {
            12 => s.to_string(),
            17 => {
                let mut digits = String::with_capacity(12);
                for (i, c) in s.chars().enumerate() {
                    if i % 3 == 2 {
                        if !matches!(c, ':' | '-' | '.') {
                            return Err(invalid());
                        }
                    } else {
                        digits.push(c);
                    }
                }
                digits
            }
            _ => return Err(invalid()),
        };

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self(octets))
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

/// Precomputed wake payload for one display
#[derive(Clone, PartialEq, Eq)]
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    pub fn for_address(mac: &MacAddress) -> Self {
        let mut bytes = [0xFFu8; MAGIC_PACKET_LEN];
        for chunk in bytes[6..].chunks_exact_mut(6) {
            chunk.copy_from_slice(&mac.0);
        }
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for MagicPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MagicPacket")
            .field("len", &self.0.len())
            .finish()
    }
}
