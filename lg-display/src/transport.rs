//! Byte transports and wake mechanisms
//!
//! The driver never touches serial ports or sockets directly. It writes
//! encoded command lines through a `Transport` and receives raw text over
//! the channel handed to `Transport::connect`. Framing happens on the
//! driver side, so transports may deliver text in any chunking.

use std::net::{Ipv4Addr, SocketAddr};

use async_trait::async_trait;
use lg_protocol::MagicPacket;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Standard Wake-on-LAN port
pub const WAKE_ON_LAN_PORT: u16 = 9;

/// Transport-level failures
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Transport is not connected")]
    NotConnected,

    #[error("Connection closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bidirectional line-oriented link to a display
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the link; received text is pushed into `received`
    async fn connect(&self, received: mpsc::UnboundedSender<String>) -> Result<(), TransportError>;

    /// Write one encoded command, terminator included
    async fn send_line(&self, line: &str) -> Result<(), TransportError>;

    /// Whether link health must be established by polling
    ///
    /// True for serial links. Network links that detect disconnects on
    /// their own return false; for them power-on goes out as Wake-on-LAN.
    fn requires_polling(&self) -> bool;
}

/// Delivers a magic packet to a sleeping display
#[async_trait]
pub trait WakeSender: Send + Sync {
    async fn wake(&self, packet: &MagicPacket) -> Result<(), TransportError>;
}

/// Sends magic packets as UDP datagrams, broadcast by default
#[derive(Debug, Clone)]
pub struct UdpWakeSender {
    target: SocketAddr,
}

impl UdpWakeSender {
    pub fn new(target: SocketAddr) -> Self {
        Self { target }
    }

    /// Limited broadcast on the Wake-on-LAN port
    pub fn broadcast() -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::BROADCAST, WAKE_ON_LAN_PORT)))
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Default for UdpWakeSender {
    fn default() -> Self {
        Self::broadcast()
    }
}

#[async_trait]
impl WakeSender for UdpWakeSender {
    async fn wake(&self, packet: &MagicPacket) -> Result<(), TransportError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.set_broadcast(true)?;
        let sent = socket.send_to(packet.as_bytes(), self.target).await?;
        tracing::debug!("Sent {} byte magic packet to {}", sent, self.target);
        Ok(())
    }
}

/// Plain TCP link, e.g. the display's network control port or a
/// serial-to-IP bridge
#[derive(Debug)]
pub struct TcpTransport {
    address: String,
    requires_polling: bool,
    writer: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl TcpTransport {
    /// Direct connection to the display; link state is detected passively
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            requires_polling: false,
            writer: tokio::sync::Mutex::new(None),
            reader: Mutex::new(None),
        }
    }

    /// Connection through a serial bridge, which must be polled like RS-232
    pub fn serial_bridge(address: impl Into<String>) -> Self {
        let mut transport = Self::new(address);
        transport.requires_polling = true;
        transport
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self, received: mpsc::UnboundedSender<String>) -> Result<(), TransportError> {
        let stream = TcpStream::connect(&self.address).await?;
        let (mut read_half, write_half) = stream.into_split();
        *self.writer.lock().await = Some(write_half);

        let address = self.address.clone();
        let handle = tokio::spawn(async move {
            let mut buf = [0u8; 512];
            loop {
                match read_half.read(&mut buf).await {
                    Ok(0) => {
                        tracing::warn!("Connection to {} closed by peer", address);
                        break;
                    }
                    Ok(n) => {
                        let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                        if received.send(text).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Read from {} failed: {}", address, e);
                        break;
                    }
                }
            }
        });

        if let Some(previous) = self.reader.lock().replace(handle) {
            previous.abort();
        }
        tracing::info!("Connected to {}", self.address);
        Ok(())
    }

    async fn send_line(&self, line: &str) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        let stream = writer.as_mut().ok_or(TransportError::NotConnected)?;
        stream.write_all(line.as_bytes()).await?;
        Ok(())
    }

    fn requires_polling(&self) -> bool {
        self.requires_polling
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if let Some(handle) = self.reader.lock().take() {
            handle.abort();
        }
    }
}
