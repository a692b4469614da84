use std::{
    process,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, RecvTimeoutError},
    },
    time::Duration,
};

use crate::{
    chat::{frame::Frame, line_reader::InputEvent},
    log::log_sink::LogSink,
    sink_debug, sink_error, sink_info,
    sync::{BoundedQueue, ShutdownSignal},
};

/// Feeds typed lines into the outbound queue.
///
/// Polls the line-reader channel with a short timeout so cancellation is
/// observed even while the user is idle. Queues the end marker like any
/// other line and then leaves; actually ending the session is the transmit
/// worker's job, once the marker has gone out on the wire.
pub struct InputWorker {
    events: Receiver<InputEvent>,
    outbound: Arc<BoundedQueue<Frame>>,
    signal: Arc<ShutdownSignal<Frame>>,
    stop: Arc<AtomicBool>,
    poll: Duration,
    log_sink: Arc<dyn LogSink>,
}

impl InputWorker {
    pub fn new(
        events: Receiver<InputEvent>,
        outbound: Arc<BoundedQueue<Frame>>,
        signal: Arc<ShutdownSignal<Frame>>,
        stop: Arc<AtomicBool>,
        poll: Duration,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            events,
            outbound,
            signal,
            stop,
            poll,
            log_sink,
        }
    }

    pub fn run(self) {
        sink_info!(self.log_sink, "[INPUT] worker started");

        while !self.stop.load(Ordering::SeqCst) && !self.signal.is_set() {
            match self.events.recv_timeout(self.poll) {
                Ok(InputEvent::Line(line)) => {
                    let frame = Frame::from_line(line);
                    // Checked before the push moves the frame away.
                    let ends_session = frame.is_end_marker();

                    if self.outbound.push(frame).is_err() {
                        sink_debug!(self.log_sink, "[INPUT] outbound queue closed");
                        break;
                    }
                    if ends_session {
                        sink_info!(self.log_sink, "[INPUT] end marker queued");
                        break;
                    }
                }
                Ok(InputEvent::Eof) => {
                    fatal_input_failure(&*self.log_sink, "stdin reached end of file");
                }
                Ok(InputEvent::Failed(e)) => {
                    fatal_input_failure(&*self.log_sink, &format!("stdin read error: {e}"));
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    fatal_input_failure(&*self.log_sink, "line reader is gone");
                }
            }
        }

        sink_info!(self.log_sink, "[INPUT] worker stopped");
    }
}

/// A chat without a keyboard cannot even tell the peer goodbye, so a dead
/// stdin takes the whole process down, not just the session.
fn fatal_input_failure(log_sink: &dyn LogSink, detail: &str) -> ! {
    eprintln!("[ERROR]: failed to get keyboard input!");
    sink_error!(log_sink, "[INPUT] fatal: {detail}");
    process::exit(1);
}
