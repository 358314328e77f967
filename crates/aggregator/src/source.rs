//! Non-blocking datagram sources.

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::AggregatorError;

/// One inbound datagram, borrowed from the source's receive buffer.
///
/// Only valid until the next call to [`DatagramSource::try_receive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datagram<'a> {
    pub payload: &'a [u8],
    pub from: SocketAddr,
}

/// A source that yields at most one pending datagram per poll without blocking.
pub trait DatagramSource {
    /// Takes the next pending datagram, or `Ok(None)` if nothing is queued.
    ///
    /// An `Err` is a socket-level failure other than "would block".
    fn try_receive(&mut self) -> io::Result<Option<Datagram<'_>>>;

    /// Local address the source is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// UDP socket bound to a fixed local address.
///
/// The socket is closed when this value is dropped.
pub struct UdpDatagramSource {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpDatagramSource {
    /// Binds `addr`. Datagrams longer than `buffer_size` are truncated.
    ///
    /// Bind failure is not retried; callers treat it as fatal.
    pub async fn bind(addr: SocketAddr, buffer_size: usize) -> Result<Self, AggregatorError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| AggregatorError::Bind { addr, source })?;

        tracing::debug!(%addr, buffer_size, "UDP socket bound");

        Ok(Self {
            socket,
            buf: vec![0u8; buffer_size],
        })
    }

    /// Size of the receive buffer in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buf.len()
    }
}

impl DatagramSource for UdpDatagramSource {
    fn try_receive(&mut self) -> io::Result<Option<Datagram<'_>>> {
        match self.socket.try_recv_from(&mut self.buf) {
            Ok((len, from)) => Ok(Some(Datagram {
                payload: &self.buf[..len],
                from,
            })),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Drop for UdpDatagramSource {
    fn drop(&mut self) {
        match self.socket.local_addr() {
            Ok(addr) => tracing::info!(%addr, "UDP socket closed"),
            Err(_) => tracing::info!("UDP socket closed"),
        }
    }
}
