use std::{
    io::{self, Write},
    sync::{
        Arc, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    chat::{frame::Frame, session::Screen},
    log::log_sink::LogSink,
    sink_info, sink_warn,
    sync::{BoundedQueue, ShutdownSignal},
};

/// Renders inbound frames to the screen, prefixed with the peer label.
///
/// Owns the inbound side of termination: popping the peer's end marker is
/// what trips the signal. Frames still in the queue when the session ends
/// are dropped unrendered. A failed write is logged and skipped; losing
/// one line of output is not worth ending the chat over.
pub struct DisplayWorker {
    inbound: Arc<BoundedQueue<Frame>>,
    signal: Arc<ShutdownSignal<Frame>>,
    screen: Screen,
    peer_label: String,
    tx_stop: Arc<AtomicBool>,
    input_stop: Arc<AtomicBool>,
    log_sink: Arc<dyn LogSink>,
}

impl DisplayWorker {
    pub fn new(
        inbound: Arc<BoundedQueue<Frame>>,
        signal: Arc<ShutdownSignal<Frame>>,
        screen: Screen,
        peer_label: String,
        tx_stop: Arc<AtomicBool>,
        input_stop: Arc<AtomicBool>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            inbound,
            signal,
            screen,
            peer_label,
            tx_stop,
            input_stop,
            log_sink,
        }
    }

    pub fn run(self) {
        sink_info!(self.log_sink, "[DISPLAY] worker started");

        while let Some(frame) = self.inbound.pop() {
            if self.signal.is_set() {
                break;
            }
            if frame.is_end_marker() {
                sink_info!(self.log_sink, "[DISPLAY] end marker received, ending session");
                self.signal.set();
                break;
            }
            self.render(&frame);
        }

        // However the loop ended, wind the sending side down too.
        self.tx_stop.store(true, Ordering::SeqCst);
        self.input_stop.store(true, Ordering::SeqCst);
        sink_info!(self.log_sink, "[DISPLAY] worker stopped");
    }

    fn render(&self, frame: &Frame) {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = render_line(&mut *screen, &self.peer_label, frame) {
            sink_warn!(self.log_sink, "[DISPLAY] render failed: {e}");
        }
    }
}

fn render_line(out: &mut impl Write, label: &str, frame: &Frame) -> io::Result<()> {
    out.write_all(label.as_bytes())?;
    out.write_all(frame.as_bytes())?;
    out.flush()
}
