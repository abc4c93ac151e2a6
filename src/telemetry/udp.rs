//! UDP telemetry channel
//!
//! Datagrams are sent unicast to a fixed peer, one MAVLink frame each. Any
//! datagram received on the socket counts as a response to the handshake.

use super::mavlink::{MavlinkEncoder, peek_message_id};
use super::{TelemetryChannel, TelemetryMessage};
use crate::error::Result;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Maximum inbound datagram we bother reading (MAVLink v2 max frame is 280)
const MAX_RECV_SIZE: usize = 512;

/// MAVLink-over-UDP channel to a single peer
pub struct UdpChannel {
    socket: UdpSocket,
    peer: SocketAddr,
    encoder: MavlinkEncoder,
    recv_buffer: [u8; MAX_RECV_SIZE],
}

impl UdpChannel {
    /// Bind a local socket and target `peer`
    pub fn connect(
        bind_address: &str,
        peer: &str,
        system_id: u8,
        component_id: u8,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(bind_address)?;
        let peer = peer.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("peer address {:?} did not resolve", peer),
            )
        })?;

        log::info!(
            "Telemetry channel {} -> {} (system {}, component {})",
            socket.local_addr()?,
            peer,
            system_id,
            component_id
        );

        Ok(Self {
            socket,
            peer,
            encoder: MavlinkEncoder::new(system_id, component_id),
            recv_buffer: [0u8; MAX_RECV_SIZE],
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl TelemetryChannel for UdpChannel {
    fn send(&mut self, msg: &TelemetryMessage) -> Result<()> {
        let frame = self.encoder.encode(msg);
        self.socket.send_to(frame, self.peer)?;
        log::trace!("Sent {} bytes to {}", frame.len(), self.peer);
        Ok(())
    }

    fn wait_for_message(&mut self, timeout: Duration) -> Result<bool> {
        // A zero read timeout is rejected by the OS
        self.socket
            .set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;

        match self.socket.recv_from(&mut self.recv_buffer) {
            Ok((n, from)) => {
                log::debug!(
                    "Received {} bytes from {} (msg id {:?})",
                    n,
                    from,
                    peek_message_id(&self.recv_buffer[..n])
                );
                Ok(true)
            }
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
