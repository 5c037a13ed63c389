//! UDP record transport.
//!
//! One datagram is one packed record, bytes identical to the shared-memory
//! layout. No framing header, no CRC: the record size is the frame, and loss
//! is tolerated by design. The sender never blocks the pipeline thread; the
//! receiver is async and owned by the consumer loop.

use std::net::SocketAddr;
use tracing::{debug, trace};

use crate::types::RECORD_SIZE;
use crate::{RelayError, Result};

/// Fire-and-forget datagram sender. Producer side.
#[derive(Debug)]
pub struct UdpSender {
    socket: std::net::UdpSocket,
    target: SocketAddr,
}

impl UdpSender {
    /// Bind an ephemeral local socket aimed at `ip:port`.
    pub fn connect(ip: &str, port: u16) -> Result<Self> {
        let target: SocketAddr = format!("{ip}:{port}").parse().map_err(|e| {
            RelayError::Bind {
                addr: format!("{ip}:{port}"),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{e}")),
            }
        })?;

        let socket = std::net::UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| RelayError::Bind { addr: "0.0.0.0:0".to_string(), source: e })?;
        socket
            .set_nonblocking(true)
            .map_err(|e| RelayError::Bind { addr: target.to_string(), source: e })?;

        debug!(%target, "UDP sender ready");
        Ok(Self { socket, target })
    }

    /// Send one packed record, non-blocking.
    ///
    /// A full socket buffer drops the frame silently; the next one replaces
    /// it anyway. Other errors are reported but non-fatal to the caller.
    pub fn send(&self, bytes: &[u8; RECORD_SIZE]) -> Result<()> {
        match self.socket.send_to(bytes, self.target) {
            Ok(_) => {
                trace!(bytes = RECORD_SIZE, target = %self.target, "Sent record datagram");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(RelayError::UdpSend { target: self.target.to_string(), source: e }),
        }
    }

    /// Destination address of this sender.
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

/// Async datagram receiver. Consumer side.
#[derive(Debug)]
pub struct UdpReceiver {
    socket: tokio::net::UdpSocket,
}

impl UdpReceiver {
    /// Bind the configured listen port on all interfaces.
    pub async fn bind(port: u16) -> Result<Self> {
        let addr = format!("0.0.0.0:{port}");
        let socket = tokio::net::UdpSocket::bind(&addr)
            .await
            .map_err(|e| RelayError::Bind { addr: addr.clone(), source: e })?;
        debug!(%addr, "UDP receiver bound");
        Ok(Self { socket })
    }

    /// Await the next datagram of exactly one record.
    ///
    /// Datagrams of any other size are skipped; they cannot be a record from
    /// a matching producer.
    pub async fn recv_record(&self) -> std::io::Result<[u8; RECORD_SIZE]> {
        let mut buf = [0u8; RECORD_SIZE + 1];
        loop {
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            if len == RECORD_SIZE {
                let mut out = [0u8; RECORD_SIZE];
                out.copy_from_slice(&buf[..RECORD_SIZE]);
                return Ok(out);
            }
            trace!(len, %from, "Skipping datagram with wrong record size");
        }
    }

    /// Drain one already-queued datagram without waiting.
    ///
    /// Returns `None` when the queue is empty or holds only wrong-sized
    /// datagrams right now.
    pub fn try_recv_record(&self) -> Option<[u8; RECORD_SIZE]> {
        let mut buf = [0u8; RECORD_SIZE + 1];
        loop {
            match self.socket.try_recv_from(&mut buf) {
                Ok((len, _)) if len == RECORD_SIZE => {
                    let mut out = [0u8; RECORD_SIZE];
                    out.copy_from_slice(&buf[..RECORD_SIZE]);
                    return Some(out);
                }
                Ok((len, from)) => {
                    trace!(len, %from, "Skipping queued datagram with wrong record size");
                }
                Err(_) => return None,
            }
        }
    }

    /// Local address the receiver is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}
