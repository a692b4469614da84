use std::{
    io::{self, BufRead, Read},
    sync::mpsc,
    thread,
};

use crate::chat::frame::MAX_FRAME_LEN;

/// What the keyboard produced: one bounded line, end of input, or a read
/// failure. The latter two are unrecoverable for a chat.
#[derive(Debug)]
pub enum InputEvent {
    Line(Vec<u8>),
    Eof,
    Failed(io::Error),
}

/// Spawns the detached thread that performs the actual blocking reads.
///
/// A blocking stdin read cannot be interrupted portably, so it lives in
/// its own thread that nobody joins; it dies with the process, or at the
/// first read after its channel closes. The channel is a rendezvous
/// (capacity 0), which keeps keyboard backpressure intact: the reader can
/// be at most one line ahead of the input worker.
///
/// Lines are bounded to [`MAX_FRAME_LEN`] bytes including the terminator;
/// anything longer arrives as successive full-size chunks.
///
/// # Errors
/// Fails only if the reader thread cannot be spawned.
pub fn spawn_line_reader<R>(mut reader: R) -> io::Result<mpsc::Receiver<InputEvent>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<InputEvent>(0);

    thread::Builder::new()
        .name("line-reader".into())
        .spawn(move || {
            loop {
                let mut line = Vec::new();
                let read = reader
                    .by_ref()
                    .take(MAX_FRAME_LEN as u64)
                    .read_until(b'\n', &mut line);

                let event = match read {
                    Ok(0) => InputEvent::Eof,
                    Ok(_) => InputEvent::Line(line),
                    Err(e) => InputEvent::Failed(e),
                };
                let finished = !matches!(event, InputEvent::Line(_));

                // Blocks until the input worker takes it (or gave up).
                if tx.send(event).is_err() || finished {
                    return;
                }
            }
        })?;

    Ok(rx)
}

/// The production shim: real stdin behind a buffered reader.
pub fn spawn_stdin_reader() -> io::Result<mpsc::Receiver<InputEvent>> {
    spawn_line_reader(io::BufReader::new(io::stdin()))
}
