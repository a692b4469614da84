use std::{fmt, io};

#[derive(Debug)]
pub enum SessionError {
    /// A worker thread could not be spawned; the session never started.
    Spawn(&'static str, io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Spawn(name, e) => write!(f, "cannot spawn {name} worker: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}
