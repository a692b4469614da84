use crate::log::log_level::LogLevel;

/// Destination for log messages.
///
/// Every worker takes an `Arc<dyn LogSink>` so tests can swap in
/// [`NoopLogSink`](crate::log::NoopLogSink) and the binary can wire the
/// file-backed [`Logger`](crate::log::logger::Logger).
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);
}
