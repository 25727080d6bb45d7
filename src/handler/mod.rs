//! Request handler module
//!
//! Routing dispatch plus the handlers behind the four routes: static file
//! serving, the sensor fixture, and the form echo endpoint.

pub mod router;
pub mod save;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
