//! LG Display Control Protocol
//!
//! Wire types for the line-oriented ASCII protocol spoken by LG commercial
//! displays over RS-232 and TCP.
//!
//! # Features
//!
//! - **Command encoding**: power, input, volume, mute and screen mute, plus
//!   status queries, in both the standard and small-display dialects
//! - **Response decoding**: acknowledgement parsing with `OK`/`NG` handling
//! - **Framing**: gathers `x`-terminated responses out of arbitrary chunks
//! - **Addressing**: set IDs compared by value (`"1"` equals `"01"`)
//! - **Wake-on-LAN**: MAC address parsing and magic packet generation
//!
//! # Quick Start
//!
//! ```rust
//! use lg_protocol::{Command, DeviceAddress, Dialect, Response};
//!
//! let id: DeviceAddress = "01".parse().unwrap();
//! assert_eq!(Command::power(id, true).encode(Dialect::Standard), "ka 01 01\r");
//!
//! let response = Response::decode("a 1 OK01x").unwrap();
//! assert!(response.is_from(id));
//! ```

pub mod address;
pub mod command;
pub mod error;
pub mod framer;
pub mod response;
pub mod wake;

pub use address::DeviceAddress;
pub use command::{Command, CommandKind, Dialect, Payload, POLL_TOKEN, TERMINATOR};
pub use error::{ProtocolError, Result};
pub use framer::{ResponseFramer, FRAME_DELIMITER};
pub use response::{parse_hex, parse_int, Response};
pub use wake::{MacAddress, MagicPacket, MAGIC_PACKET_LEN};
