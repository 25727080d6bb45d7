//! HTTP protocol layer module
//!
//! Protocol-level building blocks shared by the handlers: MIME detection,
//! form body decoding, and response builders.

pub mod form;
pub mod mime;
pub mod response;

// Re-export commonly used functions
pub use response::{
    build_400_response, build_403_response, build_404_response, build_405_response,
    build_413_response, build_file_response, build_json_response, build_options_response,
};
