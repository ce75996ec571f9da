//! Error types for lg-display

use lg_protocol::ProtocolError;

use crate::transport::TransportError;

/// Errors surfaced by the display driver
///
/// Problems with inbound frames never show up here: malformed frames,
/// foreign device IDs and unparseable values are logged and dropped by the
/// dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    /// Configuration is structurally valid JSON but semantically wrong
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Invalid device or MAC address supplied at setup
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Input number outside `1..=available`
    #[error("Input {requested} is out of range (1-{available})")]
    OutOfRangeSelection { requested: usize, available: usize },

    /// No selectable input with this key or code
    #[error("Input not found: {0}")]
    InputNotFound(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Wake-on-LAN failed: {0}")]
    Wake(String),
}

/// Result type for lg-display operations
pub type Result<T> = std::result::Result<T, DisplayError>;
