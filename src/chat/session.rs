use std::{
    io::{self, Write},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc::Receiver,
    },
    thread,
    time::Duration,
};

use crate::{
    chat::{
        display_worker::DisplayWorker, input_worker::InputWorker, line_reader::InputEvent,
        receive_worker::ReceiveWorker, session_error::SessionError,
        transmit_worker::TransmitWorker,
    },
    config::Config,
    log::log_sink::LogSink,
    sink_error, sink_info,
    sync::{BoundedQueue, ShutdownSignal},
    transport::Transport,
};

/// Depth of each of the two frame queues.
pub const QUEUE_CAPACITY: usize = 100;

const DEFAULT_RECV_TIMEOUT_MS: u64 = 200;
const DEFAULT_INPUT_POLL_MS: u64 = 200;
const DEFAULT_PEER_LABEL: &str = "Guest: ";

/// Where rendered chat lines go. Shared between the display worker (chat
/// lines) and the receive worker (the peer-ended notice); tests swap in a
/// shared buffer to assert on output.
pub type Screen = Arc<Mutex<Box<dyn Write + Send>>>;

/// The production screen: plain stdout.
#[must_use]
pub fn stdout_screen() -> Screen {
    Arc::new(Mutex::new(Box::new(io::stdout())))
}

/// Tunables read from `[session]`, all with defaults.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Socket read timeout; also how fast the receive worker notices
    /// cancellation on a silent wire.
    pub recv_timeout: Duration,
    /// How often the input worker re-checks its stop condition while the
    /// keyboard is idle.
    pub input_poll: Duration,
    /// Prefix rendered before each line from the peer.
    pub peer_label: String,
}

impl SessionConfig {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            recv_timeout: config.get_millis("session", "recv_timeout_ms", DEFAULT_RECV_TIMEOUT_MS),
            input_poll: config.get_millis("session", "input_poll_ms", DEFAULT_INPUT_POLL_MS),
            peer_label: config
                .get_non_empty_or_default("session", "peer_label", DEFAULT_PEER_LABEL)
                .to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_config(&Config::empty())
    }
}

/// One chat session: four workers, two queues, one shutdown signal.
///
/// Owns the transport handle, the input event channel, the screen and the
/// log sink; everything else (queues, signal, stop flags) is created inside
/// [`ChatSession::run`] and handed to the workers as `Arc` clones. Nothing
/// session-scoped lives in a global.
pub struct ChatSession {
    transport: Arc<dyn Transport>,
    events: Receiver<InputEvent>,
    screen: Screen,
    log_sink: Arc<dyn LogSink>,
    config: SessionConfig,
}

impl ChatSession {
    pub fn new(
        transport: Arc<dyn Transport>,
        events: Receiver<InputEvent>,
        screen: Screen,
        log_sink: Arc<dyn LogSink>,
        config: SessionConfig,
    ) -> Self {
        Self {
            transport,
            events,
            screen,
            log_sink,
            config,
        }
    }

    /// Runs the session to completion and joins all four workers.
    ///
    /// Returns once the session has fully wound down, whichever side ended
    /// it. Worker-level failures (send errors, transport errors) end the
    /// session but are not surfaced here; they are logged where they
    /// happen.
    ///
    /// # Errors
    /// Only thread spawning can fail. Workers already started are shut
    /// down and joined before the error is returned.
    pub fn run(self) -> Result<(), SessionError> {
        let outbound = Arc::new(BoundedQueue::new(QUEUE_CAPACITY));
        let inbound = Arc::new(BoundedQueue::new(QUEUE_CAPACITY));
        let signal = Arc::new(ShutdownSignal::new(vec![
            Arc::clone(&outbound),
            Arc::clone(&inbound),
        ]));

        let input_stop = Arc::new(AtomicBool::new(false));
        let tx_stop = Arc::new(AtomicBool::new(false));
        let rx_stop = Arc::new(AtomicBool::new(false));

        let input = InputWorker::new(
            self.events,
            Arc::clone(&outbound),
            Arc::clone(&signal),
            Arc::clone(&input_stop),
            self.config.input_poll,
            Arc::clone(&self.log_sink),
        );
        let transmit = TransmitWorker::new(
            Arc::clone(&outbound),
            Arc::clone(&self.transport),
            Arc::clone(&signal),
            Arc::clone(&tx_stop),
            Arc::clone(&rx_stop),
            Arc::clone(&self.log_sink),
        );
        let receive = ReceiveWorker::new(
            Arc::clone(&self.transport),
            Arc::clone(&inbound),
            Arc::clone(&signal),
            Arc::clone(&rx_stop),
            Arc::clone(&self.screen),
            Arc::clone(&self.log_sink),
        );
        let display = DisplayWorker::new(
            Arc::clone(&inbound),
            Arc::clone(&signal),
            Arc::clone(&self.screen),
            self.config.peer_label.clone(),
            Arc::clone(&tx_stop),
            Arc::clone(&input_stop),
            Arc::clone(&self.log_sink),
        );

        sink_info!(self.log_sink, "[SESSION] starting workers");

        let spawns: Vec<(&'static str, io::Result<thread::JoinHandle<()>>)> = vec![
            ("input", spawn_named("input-worker", move || input.run())),
            (
                "transmit",
                spawn_named("transmit-worker", move || transmit.run()),
            ),
            (
                "receive",
                spawn_named("receive-worker", move || receive.run()),
            ),
            (
                "display",
                spawn_named("display-worker", move || display.run()),
            ),
        ];

        let mut handles = Vec::with_capacity(spawns.len());
        let mut spawn_err: Option<SessionError> = None;
        for (name, res) in spawns {
            match res {
                Ok(h) => handles.push((name, h)),
                Err(e) if spawn_err.is_none() => spawn_err = Some(SessionError::Spawn(name, e)),
                Err(_) => {}
            }
        }

        if let Some(e) = spawn_err {
            sink_error!(self.log_sink, "[SESSION] {e}; aborting startup");
            signal.set();
            input_stop.store(true, Ordering::SeqCst);
            tx_stop.store(true, Ordering::SeqCst);
            rx_stop.store(true, Ordering::SeqCst);
            join_workers(handles, &*self.log_sink);
            return Err(e);
        }

        join_workers(handles, &*self.log_sink);
        sink_info!(self.log_sink, "[SESSION] all workers joined");
        Ok(())
    }
}

fn spawn_named<F>(name: &str, f: F) -> io::Result<thread::JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new().name(name.into()).spawn(f)
}

fn join_workers(handles: Vec<(&'static str, thread::JoinHandle<()>)>, log_sink: &dyn LogSink) {
    for (name, handle) in handles {
        if handle.join().is_err() {
            sink_error!(log_sink, "[SESSION] {name} worker panicked");
        }
    }
}
