use crate::{
    config::Config,
    log::{log_msg::LogMsg, logger_handle::LoggerHandle},
};

use std::{
    fs::{self, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

// -----------------------------------------------------------------------------
// COMPILE-TIME CONFIGURATION
// -----------------------------------------------------------------------------

/// Flush to disk every 20 lines when debugging (to see crashes near real-time).
#[cfg(feature = "log-debug")]
const FLUSH_BATCH_SIZE: u32 = 20;

/// Flush to disk every 200 lines otherwise (to save I/O).
#[cfg(not(feature = "log-debug"))]
const FLUSH_BATCH_SIZE: u32 = 200;

// -----------------------------------------------------------------------------

/// Bounded, non-blocking logger that writes to a per-process log file.
///
/// A background worker thread consumes log messages from a bounded channel
/// and writes them to a file, so the chat workers never block on disk I/O
/// and stdout stays reserved for the conversation itself.
///
/// # Architecture
///
/// 1. **Producers**: worker threads call `try_log` through a [`LoggerHandle`].
/// 2. **Queue**: a bounded `mpsc` channel buffers messages (full = dropped).
/// 3. **Consumer**: a dedicated background thread writes and flushes
///    periodically.
pub struct Logger {
    handle: LoggerHandle,
    thread: Option<thread::JoinHandle<()>>,
    file_path: PathBuf,
}

impl Logger {
    /// Resolves the log directory and filename from `[logging]` in the
    /// config and starts the logger.
    ///
    /// Recognised keys: `log_path` (directory, `~` expanded) and
    /// `log_filename` (prefix for the timestamped file name).
    #[must_use]
    pub fn start_from_config(cap: usize, config: &Config) -> Self {
        let app_name = config
            .get_non_empty("logging", "log_filename")
            .unwrap_or("rustytalk");

        if let Some(dir_str) = config.get_non_empty("logging", "log_path") {
            let dir = expand_path(dir_str);
            Self::start_in_dir(dir, Some(app_name), cap)
        } else {
            Self::start_default(Some(app_name), cap)
        }
    }

    /// Creates a `logs/` directory next to the executable and starts the
    /// logger there.
    ///
    /// # Example Filename
    /// `target/debug/logs/rustytalk-20250824_193045-pid1234.log`
    #[must_use]
    pub fn start_default(app_name: Option<&str>, cap: usize) -> Self {
        let base = exe_dir_fallback_cwd().join("logs");
        Self::start_in_dir(base, app_name, cap)
    }

    /// Starts the logger in a specific directory.
    ///
    /// Creates the directory if missing, derives a unique filename from the
    /// timestamp and process id, and spawns the background worker thread.
    pub fn start_in_dir<D: AsRef<Path>>(dir: D, app_name: Option<&str>, cap: usize) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let _ = fs::create_dir_all(&dir);

        let ts = timestamp_for_filename();
        let pid = std::process::id();

        let fname = if let Some(name) = app_name {
            format!("{name}-{ts}-pid{pid}.log")
        } else {
            format!("{ts}-pid{pid}.log")
        };

        let file_path = dir.join(&fname);

        let (tx, rx) = mpsc::sync_channel::<LogMsg>(cap);
        let handle = LoggerHandle { tx };

        let file_path_clone = file_path.clone();

        let thread = thread::Builder::new()
            .name("logger-worker".into())
            .spawn(move || {
                // Try target file -> temp file -> sink (never panic).
                let writer: Box<dyn Write + Send> = if let Ok(f) = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&file_path_clone)
                {
                    Box::new(f)
                } else {
                    let fallback = std::env::temp_dir().join("rustytalk-fallback.log");
                    match OpenOptions::new().create(true).append(true).open(&fallback) {
                        Ok(f) => Box::new(f),
                        Err(_) => Box::new(io::sink()),
                    }
                };

                let mut out: BufWriter<Box<dyn Write + Send>> = BufWriter::new(writer);
                let mut lines_written: u32 = 0;

                while let Ok(m) = rx.recv() {
                    let _ = writeln!(
                        &mut out,
                        "{} [{}] {} | {}",
                        m.ts_ms,
                        m.level.as_str(),
                        m.target,
                        m.text
                    );
                    lines_written = lines_written.wrapping_add(1);

                    // Flush periodically so data survives a crash.
                    if lines_written.is_multiple_of(FLUSH_BATCH_SIZE) {
                        let _ = out.flush();
                    }
                }

                let _ = out.flush();
            })
            .ok();

        Self {
            handle,
            thread,
            file_path,
        }
    }

    /// Returns a cloneable handle to the logger sink.
    ///
    /// Pass clones of this to workers instead of the `Logger` itself.
    #[must_use]
    pub fn handle(&self) -> LoggerHandle {
        self.handle.clone()
    }

    /// Returns the path of the active log file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Waits for the writer thread to drain and flush everything queued.
    ///
    /// The writer only stops once every [`LoggerHandle`] is gone, so call
    /// this after the workers holding handles have been joined and their
    /// handles dropped.
    pub fn shutdown(self) {
        drop(self.handle);
        if let Some(thread) = self.thread {
            let _ = thread.join();
        }
    }
}

/// Locates the directory holding the executable (target/{debug,release}),
/// falling back to the current working directory.
fn exe_dir_fallback_cwd() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Human-readable timestamp for filenames, `YYYYMMDD_HHMMSS`, without
/// pulling in a date-time crate.
fn timestamp_for_filename() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    match unix_to_calendar(secs) {
        Some(tm) => format!(
            "{:04}{:02}{:02}_{:02}{:02}{:02}",
            tm.year, tm.mon, tm.day, tm.hour, tm.min, tm.sec
        ),
        None => format!("unix_{secs}"),
    }
}

#[derive(Clone, Copy, Debug)]
struct CalendarTime {
    year: i32,
    mon: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
}

/// Minimal UNIX-to-Gregorian conversion (civil-time algorithm); `None` when
/// a component does not fit its integer type.
#[allow(clippy::many_single_char_names)]
fn unix_to_calendar(mut s: u64) -> Option<CalendarTime> {
    let sec = (s % 60) as u32;
    s /= 60;
    let min = (s % 60) as u32;
    s /= 60;
    let hour = (s % 24) as u32;
    s /= 24;

    // i128 keeps the intermediate terms from overflowing.
    let z: i128 = i128::from(s) + 719_468;

    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = mp + if mp < 10 { 3 } else { -9 }; // [1, 12]

    let year = i32::try_from(y + i128::from(m <= 2)).ok()?;
    let mon = u32::try_from(m).ok()?;
    let day = u32::try_from(d).ok()?;

    Some(CalendarTime {
        year,
        mon,
        day,
        hour,
        min,
        sec,
    })
}

/// Expands a leading tilde (`~`) to the user's home directory.
fn expand_path(path_str: &str) -> PathBuf {
    if path_str.starts_with('~') {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from);

        if let Some(mut home_path) = home {
            if path_str == "~" {
                return home_path;
            }
            if path_str.starts_with("~/") || path_str.starts_with("~\\") {
                home_path.push(&path_str[2..]);
                return home_path;
            }
        }
    }
    PathBuf::from(path_str)
}
