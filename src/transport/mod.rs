//! Frame transport between the two chat ends.
//!
//! The workers only ever see the [`Transport`] trait; the real
//! [`UdpTransport`] lives behind it, and the session tests swap in
//! scriptable in-memory doubles.

pub mod transport_error;
pub mod udp_transport;

pub use transport_error::TransportError;
pub use udp_transport::UdpTransport;

use crate::chat::frame::Frame;

/// One-frame-at-a-time datagram capability.
///
/// No delivery, ordering or duplication guarantee: frames may vanish or
/// arrive twice, and the chat does not compensate.
pub trait Transport: Send + Sync {
    /// Sends one frame to the peer.
    ///
    /// # Errors
    /// Fails only on a local transport error; a silently dropped datagram
    /// still counts as sent.
    fn send_frame(&self, frame: &Frame) -> Result<(), TransportError>;

    /// Waits for one frame, bounded by the transport's receive timeout.
    ///
    /// `Ok(None)` is a quiet tick: the timeout lapsed with nothing on the
    /// wire. Callers use it to re-check their stop condition.
    ///
    /// # Errors
    /// Fails on a real receive error, which ends the session.
    fn recv_frame(&self) -> Result<Option<Frame>, TransportError>;
}
