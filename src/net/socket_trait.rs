//! Trait abstraction for datagram reception to enable testing

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::info;

use crate::error::{Result, TelemetryError};

/// Trait for datagram-oriented input
#[async_trait]
pub trait DatagramSource: Send {
    /// Receive one datagram into `buf`, returning the number of bytes written
    async fn recv_datagram(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Wrapper around tokio::net::UdpSocket that implements DatagramSource
#[derive(Debug)]
pub struct UdpDatagramSource {
    socket: UdpSocket,
}

impl UdpDatagramSource {
    pub fn new(socket: UdpSocket) -> Self {
        Self { socket }
    }

    /// Bind the UDP socket telemetry arrives on
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Bind`] if the address cannot be bound.
    /// This is the only fatal error of the receive path.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crsf_telemetry::net::UdpDatagramSource;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let source = UdpDatagramSource::bind("0.0.0.0:12345".parse()?).await?;
    ///     println!("Listening on {}", source.local_addr()?);
    ///     Ok(())
    /// }
    /// ```
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await.map_err(|source| TelemetryError::Bind {
            addr: addr.to_string(),
            source,
        })?;

        info!("Listening for CRSF telemetry on udp://{}", addr);
        Ok(Self::new(socket))
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[async_trait]
impl DatagramSource for UdpDatagramSource {
    async fn recv_datagram(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (len, _peer) = self.socket.recv_from(buf).await?;
        Ok(len)
    }
}
