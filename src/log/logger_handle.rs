use std::sync::mpsc;

use crate::log::{log_level::LogLevel, log_msg::LogMsg, log_sink::LogSink};

/// Lightweight, cloneable handle to the process logger.
///
/// A thin sink that enqueues [`LogMsg`] into a bounded `SyncSender`. Calls
/// to [`try_log`](Self::try_log) never block: if the queue is full the
/// message is dropped and an error is returned. Obtain it from
/// [`Logger::handle`](crate::log::logger::Logger::handle) and clone it per
/// worker.
#[derive(Clone)]
pub struct LoggerHandle {
    pub(super) tx: mpsc::SyncSender<LogMsg>,
}

impl LogSink for LoggerHandle {
    #[inline]
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        let _ = self.try_log(level, msg, target);
    }
}

impl LoggerHandle {
    /// Attempts to enqueue a log message without blocking.
    ///
    /// The message is stamped with the current wall-clock time and the
    /// given `target` (usually `module_path!()`).
    ///
    /// # Errors
    /// - `TrySendError::Full` when the bounded queue is at capacity (the
    ///   message is not sent).
    /// - `TrySendError::Disconnected` when the logger worker has exited.
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), mpsc::TrySendError<LogMsg>> {
        self.tx.try_send(LogMsg::new(level, text, target))
    }
}
