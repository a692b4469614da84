//! RustyTalk is a peer-to-peer text chat over plain UDP for local networks.
//!
//! Two peers each bind a local port and point at the other; every line
//! typed on one end travels as a single datagram and is rendered on the
//! other. A lone `!` line ends the session for both sides.
//!
//! The crate is structured into several modules, each responsible for one
//! part of the pipeline: keyboard capture, the two bounded queues that
//! decouple the four worker threads, the datagram transport, and screen
//! rendering.

/// The four chat workers, the session that owns them, and the frame type.
pub mod chat;
/// Handles configuration loading and management.
pub mod config;
/// Logging utilities for the application.
pub mod log;
/// Bounded blocking queue and the shared shutdown signal.
pub mod sync;
/// Datagram transport abstraction and its UDP implementation.
pub mod transport;
