use std::{fmt, io};

#[derive(Debug)]
pub enum TransportError {
    /// The peer host/port pair did not resolve to any address.
    Resolve(String),
    /// Binding the local UDP port failed.
    Bind(u16, io::Error),
    /// Applying a socket option (the read timeout) failed.
    Configure(io::Error),
    /// A frame could not be handed to the network.
    Send(io::Error),
    /// Pulling a frame off the network failed (timeouts excluded).
    Recv(io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Resolve(addr) => write!(f, "cannot resolve peer address {addr}"),
            TransportError::Bind(port, e) => write!(f, "cannot bind UDP port {port}: {e}"),
            TransportError::Configure(e) => write!(f, "cannot configure UDP socket: {e}"),
            TransportError::Send(e) => write!(f, "send failed: {e}"),
            TransportError::Recv(e) => write!(f, "receive failed: {e}"),
        }
    }
}

impl std::error::Error for TransportError {}
