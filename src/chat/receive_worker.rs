use std::{
    io::Write,
    sync::{
        Arc, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    chat::{frame::Frame, session::Screen},
    log::log_sink::LogSink,
    sink_debug, sink_error, sink_info,
    sync::{BoundedQueue, ShutdownSignal},
    transport::Transport,
};

/// Pulls frames off the transport into the inbound queue.
///
/// The transport read is timeout-bounded, so a cancellation request is
/// observed within one tick even when the peer has gone quiet. The peer's
/// end marker is forwarded through the queue untouched; deciding that it
/// ends the session is the display worker's call.
pub struct ReceiveWorker {
    transport: Arc<dyn Transport>,
    inbound: Arc<BoundedQueue<Frame>>,
    signal: Arc<ShutdownSignal<Frame>>,
    stop: Arc<AtomicBool>,
    screen: Screen,
    log_sink: Arc<dyn LogSink>,
}

impl ReceiveWorker {
    pub fn new(
        transport: Arc<dyn Transport>,
        inbound: Arc<BoundedQueue<Frame>>,
        signal: Arc<ShutdownSignal<Frame>>,
        stop: Arc<AtomicBool>,
        screen: Screen,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            transport,
            inbound,
            signal,
            stop,
            screen,
            log_sink,
        }
    }

    pub fn run(self) {
        sink_info!(self.log_sink, "[RX] worker started");

        while !self.stop.load(Ordering::SeqCst) {
            match self.transport.recv_frame() {
                Ok(Some(frame)) => {
                    if frame.is_empty() {
                        continue;
                    }
                    if self.signal.is_set() {
                        // Session already over; drop the frame unseen.
                        break;
                    }

                    // Checked before the push moves the frame away.
                    let peer_ended = frame.is_end_marker();

                    if self.inbound.push(frame).is_err() {
                        sink_debug!(self.log_sink, "[RX] inbound queue closed");
                        break;
                    }
                    if peer_ended {
                        self.announce_peer_end();
                        break;
                    }
                }
                Ok(None) => {} // quiet tick, re-check the stop flag
                Err(e) => {
                    sink_error!(self.log_sink, "[RX] {e}");
                    self.signal.set();
                    break;
                }
            }
        }

        sink_info!(self.log_sink, "[RX] worker stopped");
    }

    fn announce_peer_end(&self) {
        sink_info!(self.log_sink, "[RX] peer sent the end marker");
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = screen.write_all(b"[INFO]: Your guest ended the chat!\n");
        let _ = screen.flush();
    }
}
