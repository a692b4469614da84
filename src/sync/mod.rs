//! Thread-coordination primitives for the chat session.
//!
//! Built on `std::sync` mutexes and condvars: a blocking [`BoundedQueue`]
//! that carries frames between workers, and a [`ShutdownSignal`] that ends
//! the session exactly once.

pub mod bounded_queue;
pub mod shutdown;

pub use bounded_queue::BoundedQueue;
pub use shutdown::ShutdownSignal;
