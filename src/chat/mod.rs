//! The chat itself: frames, the four workers, and the session that wires
//! them together.

pub mod display_worker;
pub mod frame;
pub mod input_worker;
pub mod line_reader;
pub mod receive_worker;
pub mod session;
pub mod session_error;
pub mod transmit_worker;

#[cfg(test)]
mod tests;

pub use display_worker::DisplayWorker;
pub use frame::Frame;
pub use input_worker::InputWorker;
pub use line_reader::{InputEvent, spawn_line_reader, spawn_stdin_reader};
pub use receive_worker::ReceiveWorker;
pub use session::{ChatSession, Screen, SessionConfig, stdout_screen};
pub use session_error::SessionError;
pub use transmit_worker::TransmitWorker;
