// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// File-system layout the server serves from.
///
/// Replaces any ambient "static folder" notion: the document root and the
/// sensor fixture path are explicit and handed to the router at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Directory containing `index.html` and the static assets
    pub document_root: String,
    /// Canned sensor snapshot returned verbatim by `GET /data`
    pub fixture_file: String,
}

/// HTTP protocol limits
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub max_body_size: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format: "common" or "combined"
    pub access_log_format: String,
}
