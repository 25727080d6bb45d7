//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Routes are an explicit table
//! from (method, path pattern) to a handler target, built once at startup;
//! there is no dynamic registration.

use crate::config::AppState;
use crate::handler::{save, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Handler targets a request can be dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// `GET /`: serve index.html from the document root
    Index,
    /// `GET /data`: serve the sensor fixture file
    SensorData,
    /// `POST /save`: echo posted form fields as JSON
    SaveEcho,
    /// `GET /<path>`: serve a static asset from the document root
    Asset,
}

/// Path matching rule for a route
#[derive(Debug)]
enum RoutePattern {
    Exact(&'static str),
    /// Catch-all for any remaining path
    AnyPath,
}

impl RoutePattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == *p,
            Self::AnyPath => true,
        }
    }
}

/// One routing table entry
#[derive(Debug)]
struct Route {
    pattern: RoutePattern,
    method: Method,
    target: RouteTarget,
    allow: &'static str,
}

/// Result of a table lookup
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch {
    Target(RouteTarget),
    Options { allow: &'static str },
    MethodNotAllowed { allow: &'static str },
    NotFound,
}

/// The fixed routing table; exact patterns come before the catch-all
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: vec![
                Route {
                    pattern: RoutePattern::Exact("/"),
                    method: Method::GET,
                    target: RouteTarget::Index,
                    allow: "GET, HEAD, OPTIONS",
                },
                Route {
                    pattern: RoutePattern::Exact("/data"),
                    method: Method::GET,
                    target: RouteTarget::SensorData,
                    allow: "GET, HEAD, OPTIONS",
                },
                Route {
                    pattern: RoutePattern::Exact("/save"),
                    method: Method::POST,
                    target: RouteTarget::SaveEcho,
                    allow: "POST, OPTIONS",
                },
                Route {
                    pattern: RoutePattern::AnyPath,
                    method: Method::GET,
                    target: RouteTarget::Asset,
                    allow: "GET, HEAD, OPTIONS",
                },
            ],
        }
    }

    /// Find the handler for a method/path pair.
    ///
    /// The first pattern match in table order decides the route; HEAD is
    /// accepted wherever GET is, OPTIONS answers with the route's allow set,
    /// and any other method mismatch is a 405.
    pub fn lookup(&self, method: &Method, path: &str) -> RouteMatch {
        let Some(route) = self.routes.iter().find(|r| r.pattern.matches(path)) else {
            return RouteMatch::NotFound;
        };

        if *method == route.method || (route.method == Method::GET && *method == Method::HEAD) {
            RouteMatch::Target(route.target)
        } else if *method == Method::OPTIONS {
            RouteMatch::Options { allow: route.allow }
        } else {
            RouteMatch::MethodNotAllowed { allow: route.allow }
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let is_head = method == Method::HEAD;

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        method.to_string(),
        path.clone(),
    );
    entry.http_version = if req.version() == hyper::Version::HTTP_10 {
        "1.0".to_string()
    } else {
        "1.1".to_string()
    };
    entry.referer = header_value(&req, "referer");
    entry.user_agent = header_value(&req, "user-agent");

    let response = if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        resp
    } else {
        let ctx = RequestContext {
            path: &path,
            is_head,
        };
        match state.routes.lookup(&method, &path) {
            RouteMatch::Target(RouteTarget::Index) => static_files::serve_index(&ctx, &state).await,
            RouteMatch::Target(RouteTarget::SensorData) => {
                static_files::serve_fixture(&ctx, &state).await
            }
            RouteMatch::Target(RouteTarget::SaveEcho) => save::echo_form(req).await,
            RouteMatch::Target(RouteTarget::Asset) => static_files::serve_asset(&ctx, &state).await,
            RouteMatch::Options { allow } => http::build_options_response(allow),
            RouteMatch::MethodNotAllowed { allow } => http::build_405_response(allow),
            RouteMatch::NotFound => http::build_404_response(),
        }
    };

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Read a request header as an owned string, if present and valid UTF-8
fn header_value(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    let size_str = content_length.to_str().ok()?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
        _ => None,
    }
}
