/// Severity levels for log messages, ordered from most to least verbose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Very fine-grained events, e.g. every queue hand-off.
    Trace,
    /// Diagnostic events useful while debugging the worker loops.
    Debug,
    /// Coarse progress of the session (start, termination, peer events).
    Info,
    /// Something unexpected that the session can survive.
    Warn,
    /// A failure that ends the session or the process.
    Error,
}

impl LogLevel {
    /// Fixed-width tag used in the log file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}
