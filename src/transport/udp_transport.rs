use std::{
    io,
    net::{SocketAddr, ToSocketAddrs, UdpSocket},
    time::Duration,
};

use crate::{
    chat::frame::{Frame, MAX_FRAME_LEN},
    transport::{Transport, transport_error::TransportError},
};

/// UDP endpoint bound to a local port and aimed at one fixed peer.
///
/// The peer address is resolved once at startup and never changes:
/// datagrams from third parties cannot redirect outgoing traffic. Sends
/// carry exactly the frame's length. Reads time out so the receive worker
/// can look up from the socket and notice the session ending.
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpTransport {
    /// Binds `0.0.0.0:local_port` and resolves the peer endpoint.
    ///
    /// # Errors
    /// Fails if the peer does not resolve, the port cannot be bound, or
    /// the read timeout cannot be applied.
    pub fn bind(
        local_port: u16,
        peer_host: &str,
        peer_port: u16,
        recv_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let peer = (peer_host, peer_port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| TransportError::Resolve(format!("{peer_host}:{peer_port}")))?;

        let socket = UdpSocket::bind(("0.0.0.0", local_port))
            .map_err(|e| TransportError::Bind(local_port, e))?;

        Self::from_socket(socket, peer, recv_timeout)
    }

    /// Wraps an already-bound socket. Lets callers that learned their port
    /// from the OS (bind to 0) pair two endpoints afterwards.
    pub fn from_socket(
        socket: UdpSocket,
        peer: SocketAddr,
        recv_timeout: Duration,
    ) -> Result<Self, TransportError> {
        socket
            .set_read_timeout(Some(recv_timeout))
            .map_err(TransportError::Configure)?;

        Ok(Self { socket, peer })
    }

    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Transport for UdpTransport {
    fn send_frame(&self, frame: &Frame) -> Result<(), TransportError> {
        self.socket
            .send_to(frame.as_bytes(), self.peer)
            .map_err(TransportError::Send)?;
        Ok(())
    }

    fn recv_frame(&self) -> Result<Option<Frame>, TransportError> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        match self.socket.recv_from(&mut buf) {
            Ok((len, _src)) => Ok(Some(Frame::from_slice(&buf[..len]))),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(TransportError::Recv(e)),
        }
    }
}
