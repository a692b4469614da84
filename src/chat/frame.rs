use bytes::Bytes;

/// Upper bound on one frame, line terminator included. Longer input lines
/// are split into successive frames of this size.
pub const MAX_FRAME_LEN: usize = 1024;

/// One unit of chat data: a line typed locally or a datagram from the peer.
///
/// Content is opaque bytes (not necessarily UTF-8); identity is by value.
/// Constructors cap the payload at [`MAX_FRAME_LEN`] so nothing oversized
/// ever reaches a queue or the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Bytes);

impl Frame {
    /// Wraps a line read from the keyboard. Takes ownership of the buffer;
    /// no copy in the common case.
    #[must_use]
    pub fn from_line(line: Vec<u8>) -> Self {
        let mut payload = Bytes::from(line);
        payload.truncate(MAX_FRAME_LEN);
        Self(payload)
    }

    /// Copies a received datagram (or a test literal) into a frame.
    #[must_use]
    pub fn from_slice(data: &[u8]) -> Self {
        let end = data.len().min(MAX_FRAME_LEN);
        Self(Bytes::copy_from_slice(&data[..end]))
    }

    /// The reserved frame that ends the session.
    #[must_use]
    pub fn end_marker() -> Self {
        Self(Bytes::from_static(b"!\n"))
    }

    /// True for `!` followed by a line terminator.
    ///
    /// `!\r\n` is accepted too so a peer typing from a CRLF platform can
    /// still end the chat. Not escapable: a user line with exactly this
    /// content ends the session, matching what travels on the wire.
    #[must_use]
    pub fn is_end_marker(&self) -> bool {
        matches!(self.0.as_ref(), b"!\n" | b"!\r\n")
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
