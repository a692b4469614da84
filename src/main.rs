//! The chat binary.
//!
//! `rustytalk <local-port> <peer-host> <peer-port> [config]` binds the
//! local UDP port, aims at the peer, and runs one chat session on stdin
//! and stdout. Typing `!` on a line of its own ends the chat for both
//! sides.

use rustytalk::{
    chat::{ChatSession, SessionConfig, spawn_stdin_reader, stdout_screen},
    config::Config,
    log::{LogSink, Logger},
    sink_error, sink_info,
    transport::UdpTransport,
};
use std::env;
use std::process;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "rustytalk.conf";
const LOG_QUEUE_CAP: usize = 256;

fn main() {
    let args: Vec<String> = env::args().collect();

    let Some((local_port, peer_host, peer_port, config_path)) = parse_args(&args) else {
        let prog = args.first().map_or("rustytalk", String::as_str);
        eprintln!("Usage: {prog} <local-port> <peer-host> <peer-port> [config]");
        process::exit(2);
    };

    let config = match &config_path {
        Some(path) => Config::load(path),
        None => Config::load(DEFAULT_CONFIG_PATH),
    }
    .unwrap_or_else(|e| {
        // A missing default file is normal; a named one failing is not.
        if config_path.is_some() {
            eprintln!("Error loading config: {e}. Using defaults.");
        }
        Config::empty()
    });

    let session_cfg = SessionConfig::from_config(&config);

    let logger = Logger::start_from_config(LOG_QUEUE_CAP, &config);
    let log_sink: Arc<dyn LogSink> = Arc::new(logger.handle());
    sink_info!(
        log_sink,
        "[SESSION] log file: {}",
        logger.file_path().display()
    );

    let transport = match UdpTransport::bind(
        local_port,
        &peer_host,
        peer_port,
        session_cfg.recv_timeout,
    ) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("[ERROR]: setting up connection failed!");
            sink_error!(log_sink, "[UDP] {e}");
            process::exit(1);
        }
    };
    sink_info!(
        log_sink,
        "[UDP] bound port {local_port}, peer {}",
        transport.peer()
    );

    let events = match spawn_stdin_reader() {
        Ok(rx) => rx,
        Err(e) => {
            eprintln!("[ERROR]: failed to get keyboard input!");
            sink_error!(log_sink, "[SESSION] cannot start line reader: {e}");
            process::exit(1);
        }
    };

    println!("[INFO]: Starting Chat.");

    let session = ChatSession::new(
        Arc::new(transport),
        events,
        stdout_screen(),
        Arc::clone(&log_sink),
        session_cfg,
    );

    if let Err(e) = session.run() {
        eprintln!("[ERROR]: {e}");
        sink_error!(log_sink, "[SESSION] {e}");
        process::exit(1);
    }

    println!("[INFO]: Chat Terminated.");
    sink_info!(log_sink, "[SESSION] chat terminated");

    // Last handle goes away here so the writer can drain and stop.
    drop(log_sink);
    logger.shutdown();
}

fn parse_args(args: &[String]) -> Option<(u16, String, u16, Option<String>)> {
    if args.len() < 4 || args.len() > 5 {
        return None;
    }
    let local_port = args[1].parse().ok()?;
    let peer_host = args[2].clone();
    let peer_port = args[3].parse().ok()?;
    Some((local_port, peer_host, peer_port, args.get(4).cloned()))
}
