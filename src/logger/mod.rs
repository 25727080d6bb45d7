//! Logger module
//!
//! Logging for the development server: startup banner, access log lines,
//! warnings and errors. Everything goes to stdout/stderr; a dev server has
//! no business writing log files.

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("Sensor mock server started");
    println!("Listening on: http://{addr}");
    println!("Document root: {}", config.paths.document_root);
    println!("Sensor fixture: {}", config.paths.fixture_file);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("Routes:");
    println!("  GET  /       -> index.html");
    println!("  GET  /data   -> sensor fixture (JSON)");
    println!("  POST /save   -> echo form fields as JSON");
    println!("  GET  /<path> -> static asset from document root");
    println!("======================================\n");
}

/// Log a formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    println!("{}", entry.format(format));
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}
