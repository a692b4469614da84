#[cfg(test)]
#[allow(clippy::module_inception)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
mod tests {
    use super::super::display_worker::DisplayWorker;
    use super::super::frame::Frame;
    use super::super::input_worker::InputWorker;
    use super::super::line_reader::{InputEvent, spawn_line_reader};
    use super::super::receive_worker::ReceiveWorker;
    use super::super::session::{ChatSession, Screen, SessionConfig};
    use super::super::transmit_worker::TransmitWorker;
    use crate::log::NoopLogSink;
    use crate::sync::{BoundedQueue, ShutdownSignal};
    use crate::transport::{Transport, TransportError};
    use std::io::{self, Cursor, Write};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, mpsc};
    use std::thread;
    use std::time::{Duration, Instant};

    /// Poll interval / receive tick for every test double.
    const TICK: Duration = Duration::from_millis(25);
    const DEADLINE: Duration = Duration::from_secs(5);

    // -------------------------------------------------------------------
    // Test doubles
    // -------------------------------------------------------------------

    /// A screen the test can read back.
    #[derive(Clone, Default)]
    struct ScreenBuffer(Arc<Mutex<Vec<u8>>>);

    impl ScreenBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }

        fn as_screen(&self) -> Screen {
            Arc::new(Mutex::new(Box::new(self.clone()) as Box<dyn Write + Send>))
        }
    }

    impl Write for ScreenBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Scriptable in-memory wire. Inbound frames come from a channel the
    /// test controls; outbound frames are recorded on another one.
    struct TestTransport {
        wire_in: Mutex<mpsc::Receiver<Frame>>,
        sent: Mutex<mpsc::Sender<Frame>>,
        attempts: AtomicUsize,
        fail_sends: bool,
        fail_recvs: bool,
    }

    impl TestTransport {
        fn build(
            wire_in: mpsc::Receiver<Frame>,
            sent: mpsc::Sender<Frame>,
            fail_sends: bool,
            fail_recvs: bool,
        ) -> Arc<Self> {
            Arc::new(Self {
                wire_in: Mutex::new(wire_in),
                sent: Mutex::new(sent),
                attempts: AtomicUsize::new(0),
                fail_sends,
                fail_recvs,
            })
        }

        /// Everything sent comes straight back, like a peer echoing.
        fn echo() -> Arc<Self> {
            let (tx, rx) = mpsc::channel();
            Self::build(rx, tx, false, false)
        }

        /// Nothing ever arrives; sends are recorded for the test.
        fn quiet() -> (Arc<Self>, mpsc::Receiver<Frame>) {
            let (_no_peer, silent_rx) = mpsc::channel();
            let (sent_tx, sent_rx) = mpsc::channel();
            (Self::build(silent_rx, sent_tx, false, false), sent_rx)
        }

        /// The peer sends the given frames, then goes quiet.
        fn scripted(frames: &[&[u8]]) -> (Arc<Self>, mpsc::Receiver<Frame>) {
            let (peer_tx, peer_rx) = mpsc::channel();
            for f in frames {
                peer_tx.send(Frame::from_slice(f)).unwrap();
            }
            let (sent_tx, sent_rx) = mpsc::channel();
            (Self::build(peer_rx, sent_tx, false, false), sent_rx)
        }

        /// Every send fails.
        fn failing() -> Arc<Self> {
            let (_no_peer, silent_rx) = mpsc::channel();
            let (sent_tx, _) = mpsc::channel();
            Self::build(silent_rx, sent_tx, true, false)
        }

        /// Every receive fails.
        fn broken_wire() -> Arc<Self> {
            let (_no_peer, silent_rx) = mpsc::channel();
            let (sent_tx, _) = mpsc::channel();
            Self::build(silent_rx, sent_tx, false, true)
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl Transport for TestTransport {
        fn send_frame(&self, frame: &Frame) -> Result<(), TransportError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_sends {
                return Err(TransportError::Send(io::Error::other("wire down")));
            }
            let _ = self.sent.lock().unwrap().send(frame.clone());
            Ok(())
        }

        fn recv_frame(&self) -> Result<Option<Frame>, TransportError> {
            if self.fail_recvs {
                return Err(TransportError::Recv(io::Error::other("wire broken")));
            }
            match self.wire_in.lock().unwrap().recv_timeout(TICK) {
                Ok(f) => Ok(Some(f)),
                // Empty or hung up: a quiet wire either way.
                Err(_) => Ok(None),
            }
        }
    }

    fn test_config() -> SessionConfig {
        SessionConfig {
            recv_timeout: TICK,
            input_poll: TICK,
            peer_label: "Guest: ".to_string(),
        }
    }

    fn session_with(
        transport: Arc<dyn Transport>,
        events: mpsc::Receiver<InputEvent>,
        screen: &ScreenBuffer,
    ) -> ChatSession {
        ChatSession::new(
            transport,
            events,
            screen.as_screen(),
            Arc::new(NoopLogSink),
            test_config(),
        )
    }

    /// Runs the session on its own thread and panics if it does not wind
    /// down within the deadline.
    fn run_to_completion(session: ChatSession) {
        let (done_tx, done_rx) = mpsc::channel();
        let runner = thread::spawn(move || {
            done_tx.send(session.run()).unwrap();
        });
        done_rx
            .recv_timeout(DEADLINE)
            .expect("session should wind down in time")
            .expect("session setup should succeed");
        runner.join().unwrap();
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < DEADLINE {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        cond()
    }

    // -------------------------------------------------------------------
    // Single-worker tests
    // -------------------------------------------------------------------

    #[test]
    fn input_worker_queues_lines_and_leaves_after_the_marker() {
        let outbound = Arc::new(BoundedQueue::new(8));
        let signal = Arc::new(ShutdownSignal::new(vec![Arc::clone(&outbound)]));
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, events) = mpsc::sync_channel(0);

        let worker = InputWorker::new(
            events,
            Arc::clone(&outbound),
            Arc::clone(&signal),
            stop,
            TICK,
            Arc::new(NoopLogSink),
        );

        let (done_tx, done_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            worker.run();
            done_tx.send(()).unwrap();
        });

        tx.send(InputEvent::Line(b"a\n".to_vec())).unwrap();
        tx.send(InputEvent::Line(b"!\n".to_vec())).unwrap();

        done_rx
            .recv_timeout(DEADLINE)
            .expect("worker should leave after the marker");
        handle.join().unwrap();

        assert_eq!(outbound.pop().unwrap().as_bytes(), b"a\n");
        assert!(outbound.pop().unwrap().is_end_marker());
        // Queuing the marker is not the input worker's shutdown to start.
        assert!(!signal.is_set());
    }

    #[test]
    fn transmit_worker_sends_the_marker_then_starts_shutdown() {
        let outbound = Arc::new(BoundedQueue::new(8));
        let signal = Arc::new(ShutdownSignal::new(vec![Arc::clone(&outbound)]));
        let stop = Arc::new(AtomicBool::new(false));
        let rx_stop = Arc::new(AtomicBool::new(false));
        let (transport, sent_rx) = TestTransport::quiet();

        outbound.push(Frame::from_slice(b"ping\n")).unwrap();
        outbound.push(Frame::end_marker()).unwrap();

        let worker = TransmitWorker::new(
            Arc::clone(&outbound),
            transport,
            Arc::clone(&signal),
            stop,
            Arc::clone(&rx_stop),
            Arc::new(NoopLogSink),
        );

        let (done_tx, done_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            worker.run();
            done_tx.send(()).unwrap();
        });

        assert_eq!(
            sent_rx.recv_timeout(DEADLINE).unwrap().as_bytes(),
            b"ping\n"
        );
        assert!(sent_rx.recv_timeout(DEADLINE).unwrap().is_end_marker());

        done_rx
            .recv_timeout(DEADLINE)
            .expect("worker should stop after the marker");
        handle.join().unwrap();

        assert!(signal.is_set());
        assert!(rx_stop.load(Ordering::SeqCst));
    }

    #[test]
    fn transmit_worker_turns_a_send_failure_into_shutdown() {
        let outbound = Arc::new(BoundedQueue::new(8));
        let signal = Arc::new(ShutdownSignal::new(vec![Arc::clone(&outbound)]));
        let stop = Arc::new(AtomicBool::new(false));
        let rx_stop = Arc::new(AtomicBool::new(false));
        let transport = TestTransport::failing();

        outbound.push(Frame::from_slice(b"doomed\n")).unwrap();

        let worker = TransmitWorker::new(
            Arc::clone(&outbound),
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&signal),
            stop,
            Arc::clone(&rx_stop),
            Arc::new(NoopLogSink),
        );

        let (done_tx, done_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            worker.run();
            done_tx.send(()).unwrap();
        });

        done_rx
            .recv_timeout(DEADLINE)
            .expect("worker should stop after the failure");
        handle.join().unwrap();

        assert_eq!(transport.attempts(), 1);
        assert!(signal.is_set());
        assert!(rx_stop.load(Ordering::SeqCst));
    }

    #[test]
    fn receive_worker_forwards_frames_and_announces_the_peer_end() {
        let inbound = Arc::new(BoundedQueue::new(8));
        let signal = Arc::new(ShutdownSignal::new(vec![Arc::clone(&inbound)]));
        let stop = Arc::new(AtomicBool::new(false));
        let screen = ScreenBuffer::default();
        let (transport, _sent_rx) = TestTransport::scripted(&[b"hey\n", b"!\n"]);

        let worker = ReceiveWorker::new(
            transport,
            Arc::clone(&inbound),
            Arc::clone(&signal),
            stop,
            screen.as_screen(),
            Arc::new(NoopLogSink),
        );

        let (done_tx, done_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            worker.run();
            done_tx.send(()).unwrap();
        });

        done_rx
            .recv_timeout(DEADLINE)
            .expect("worker should stop after the peer marker");
        handle.join().unwrap();

        assert_eq!(inbound.pop().unwrap().as_bytes(), b"hey\n");
        assert!(inbound.pop().unwrap().is_end_marker());
        assert!(screen.contents().contains("[INFO]: Your guest ended the chat!"));
        // Inbound termination is decided by the display worker, not here.
        assert!(!signal.is_set());
    }

    #[test]
    fn receive_worker_treats_a_transport_error_as_session_ending() {
        let inbound = Arc::new(BoundedQueue::new(8));
        let signal = Arc::new(ShutdownSignal::new(vec![Arc::clone(&inbound)]));
        let stop = Arc::new(AtomicBool::new(false));
        let screen = ScreenBuffer::default();
        let transport = TestTransport::broken_wire();

        let worker = ReceiveWorker::new(
            transport,
            Arc::clone(&inbound),
            Arc::clone(&signal),
            stop,
            screen.as_screen(),
            Arc::new(NoopLogSink),
        );

        let (done_tx, done_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            worker.run();
            done_tx.send(()).unwrap();
        });

        done_rx
            .recv_timeout(DEADLINE)
            .expect("worker should stop on a broken wire");
        handle.join().unwrap();

        assert!(signal.is_set());
        assert_eq!(screen.contents(), "");
    }

    #[test]
    fn display_worker_renders_lines_and_ends_on_the_marker() {
        let inbound = Arc::new(BoundedQueue::new(8));
        let signal = Arc::new(ShutdownSignal::new(vec![Arc::clone(&inbound)]));
        let tx_stop = Arc::new(AtomicBool::new(false));
        let input_stop = Arc::new(AtomicBool::new(false));
        let screen = ScreenBuffer::default();

        inbound.push(Frame::from_slice(b"hola\n")).unwrap();
        inbound.push(Frame::end_marker()).unwrap();

        let worker = DisplayWorker::new(
            Arc::clone(&inbound),
            Arc::clone(&signal),
            screen.as_screen(),
            "Guest: ".to_string(),
            Arc::clone(&tx_stop),
            Arc::clone(&input_stop),
            Arc::new(NoopLogSink),
        );

        let (done_tx, done_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            worker.run();
            done_tx.send(()).unwrap();
        });

        done_rx
            .recv_timeout(DEADLINE)
            .expect("worker should stop after the marker");
        handle.join().unwrap();

        assert_eq!(screen.contents(), "Guest: hola\n");
        assert!(signal.is_set());
        assert!(tx_stop.load(Ordering::SeqCst));
        assert!(input_stop.load(Ordering::SeqCst));
    }

    // -------------------------------------------------------------------
    // Whole-session scenarios
    // -------------------------------------------------------------------

    #[test]
    fn typed_line_echoes_back_rendered_with_the_peer_label() {
        let screen = ScreenBuffer::default();
        let transport = TestTransport::echo();
        let (tx, events) = mpsc::sync_channel(0);
        let session = session_with(transport, events, &screen);

        let (done_tx, done_rx) = mpsc::channel();
        let runner = thread::spawn(move || {
            done_tx.send(session.run()).unwrap();
        });

        tx.send(InputEvent::Line(b"hello\n".to_vec())).unwrap();
        assert!(
            wait_until(|| screen.contents().contains("Guest: hello\n")),
            "echoed line never rendered; screen: {:?}",
            screen.contents()
        );

        tx.send(InputEvent::Line(b"!\n".to_vec())).unwrap();
        done_rx
            .recv_timeout(DEADLINE)
            .expect("session should end after the marker")
            .expect("session setup should succeed");
        runner.join().unwrap();

        let out = screen.contents();
        assert_eq!(out.matches("Guest: ").count(), 1, "screen: {out:?}");
        assert!(!out.contains("Guest: !"), "marker was rendered: {out:?}");
    }

    #[test]
    fn local_end_marker_winds_down_all_four_workers() {
        let screen = ScreenBuffer::default();
        let (transport, sent_rx) = TestTransport::quiet();
        let events = spawn_line_reader(Cursor::new(b"!\n".to_vec())).unwrap();

        run_to_completion(session_with(transport, events, &screen));

        let sent = sent_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("the marker should have been transmitted");
        assert!(sent.is_end_marker());
        assert!(sent_rx.try_recv().is_err(), "nothing else should go out");
        assert_eq!(screen.contents(), "");
    }

    #[test]
    fn send_failure_ends_the_session_without_deadlock() {
        let screen = ScreenBuffer::default();
        let transport = TestTransport::failing();
        let (tx, events) = mpsc::sync_channel(0);
        let session = session_with(Arc::clone(&transport) as Arc<dyn Transport>, events, &screen);

        let (done_tx, done_rx) = mpsc::channel();
        let runner = thread::spawn(move || {
            done_tx.send(session.run()).unwrap();
        });

        tx.send(InputEvent::Line(b"doomed\n".to_vec())).unwrap();

        done_rx
            .recv_timeout(DEADLINE)
            .expect("session should end after the send failure")
            .expect("session setup should succeed");
        runner.join().unwrap();

        assert_eq!(transport.attempts(), 1);
        assert_eq!(screen.contents(), "");
    }

    #[test]
    fn peer_end_marker_ends_the_session_and_is_never_rendered() {
        let screen = ScreenBuffer::default();
        let (transport, _sent_rx) = TestTransport::scripted(&[b"hi\n", b"!\n"]);
        let (keep_keyboard_alive, events) = mpsc::sync_channel::<InputEvent>(0);

        run_to_completion(session_with(transport, events, &screen));

        let out = screen.contents();
        assert!(out.contains("Guest: hi\n"), "screen: {out:?}");
        assert!(
            out.contains("[INFO]: Your guest ended the chat!"),
            "screen: {out:?}"
        );
        assert!(!out.contains("Guest: !"), "marker was rendered: {out:?}");
        drop(keep_keyboard_alive);
    }
}
