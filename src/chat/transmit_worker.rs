use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    chat::frame::Frame,
    log::log_sink::LogSink,
    sink_debug, sink_error, sink_info, sink_trace,
    sync::{BoundedQueue, ShutdownSignal},
    transport::Transport,
};

/// Drains the outbound queue onto the wire.
///
/// The end marker is sent to the peer like any other frame; only after it
/// has gone out does this worker trip the signal, so the peer always hears
/// the goodbye before the local side tears down. It is the one worker that
/// starts shutdown when the local user ends the chat.
pub struct TransmitWorker {
    outbound: Arc<BoundedQueue<Frame>>,
    transport: Arc<dyn Transport>,
    signal: Arc<ShutdownSignal<Frame>>,
    stop: Arc<AtomicBool>,
    rx_stop: Arc<AtomicBool>,
    log_sink: Arc<dyn LogSink>,
}

impl TransmitWorker {
    pub fn new(
        outbound: Arc<BoundedQueue<Frame>>,
        transport: Arc<dyn Transport>,
        signal: Arc<ShutdownSignal<Frame>>,
        stop: Arc<AtomicBool>,
        rx_stop: Arc<AtomicBool>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            outbound,
            transport,
            signal,
            stop,
            rx_stop,
            log_sink,
        }
    }

    pub fn run(self) {
        sink_info!(self.log_sink, "[TX] worker started");

        while !self.stop.load(Ordering::SeqCst) {
            let Some(frame) = self.outbound.pop() else {
                sink_debug!(self.log_sink, "[TX] outbound queue closed");
                break;
            };

            let ends_session = frame.is_end_marker();

            if let Err(e) = self.transport.send_frame(&frame) {
                eprintln!("[ERROR]: cannot send message");
                sink_error!(self.log_sink, "[TX] {e}");
                self.begin_shutdown();
                break;
            }
            sink_trace!(self.log_sink, "[TX] sent {} bytes", frame.len());

            if ends_session {
                sink_info!(self.log_sink, "[TX] end marker sent, ending session");
                self.begin_shutdown();
                break;
            }
            if self.signal.is_set() {
                self.begin_shutdown();
                break;
            }
        }

        sink_info!(self.log_sink, "[TX] worker stopped");
    }

    /// Trips the signal (closing both queues) and asks the receive worker
    /// to stop at its next socket tick.
    fn begin_shutdown(&self) {
        self.signal.set();
        self.rx_stop.store(true, Ordering::SeqCst);
    }
}
