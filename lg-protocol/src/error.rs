//! Error types for the lg-protocol crate.

/// Errors produced while encoding or decoding display protocol frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Frame had fewer than the three required tokens
    #[error("Malformed frame, expected 3 tokens: {0:?}")]
    MalformedFrame(String),

    /// Device answered with a negative acknowledgement
    #[error("Negative acknowledgement: {0:?}")]
    NegativeAcknowledgement(String),

    /// Device ID token is not a decimal integer
    #[error("Invalid device address: {0:?}")]
    InvalidDeviceAddress(String),

    /// MAC address does not match any accepted notation
    #[error("Invalid MAC address: {0:?}")]
    InvalidMacAddress(String),

    /// Numeric payload could not be parsed
    #[error("Unable to parse value {value:?} as {expected}")]
    ValueParse {
        /// The raw payload token
        value: String,
        /// What the payload was expected to be
        expected: &'static str,
    },
}

/// Result type for lg-protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
