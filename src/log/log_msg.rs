use std::time::{SystemTime, UNIX_EPOCH};

use crate::log::log_level::LogLevel;

/// One log event: severity, millisecond timestamp, origin and payload.
#[derive(Debug, Clone)]
pub struct LogMsg {
    /// The severity level of the entry.
    pub level: LogLevel,
    /// Milliseconds since the UNIX epoch at creation time.
    pub ts_ms: u128,
    /// The message content.
    pub text: String,
    /// The origin of the entry, typically `module_path!()`.
    pub target: &'static str,
}

impl LogMsg {
    /// Creates a message stamped with the current wall-clock time.
    pub fn new(level: LogLevel, text: impl Into<String>, target: &'static str) -> Self {
        Self {
            level,
            ts_ms: now_millis(),
            text: text.into(),
            target,
        }
    }
}

/// Milliseconds since the UNIX epoch; 0 if the clock is before the epoch.
#[must_use]
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
