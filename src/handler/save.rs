//! Form echo handler for `POST /save`
//!
//! The front end posts the values it would save to a real sensor; this
//! handler parses the form and mirrors it back as a JSON object so the
//! client code can verify what it actually sent.

use crate::http::{self, form};
use crate::logger;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response};

/// Collect the request body and echo its form fields as JSON
pub async fn echo_form(req: Request<hyper::body::Incoming>) -> Response<Full<Bytes>> {
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_warning(&format!("Failed to read /save body: {e}"));
            return http::build_400_response("failed to read request body");
        }
    };

    build_echo_response(&body, content_type.as_deref())
}

/// Parse the body and build the mirrored JSON response.
///
/// Split from the body collection so the echo contract is testable without
/// a live hyper body.
pub fn build_echo_response(body: &[u8], content_type: Option<&str>) -> Response<Full<Bytes>> {
    match form::parse_form_body(body, content_type) {
        Ok(fields) => {
            let json = serde_json::to_vec(&fields).unwrap_or_else(|e| {
                logger::log_error(&format!("Failed to serialize form fields: {e}"));
                b"{}".to_vec()
            });
            http::build_json_response(json, false)
        }
        Err(e) => {
            logger::log_warning(&format!("Rejected /save body: {e}"));
            http::build_400_response(&e.to_string())
        }
    }
}
