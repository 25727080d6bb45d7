//! Static file serving module
//!
//! Serves index.html, the sensor fixture, and arbitrary assets from the
//! document root. Asset paths are canonicalized and checked against the
//! canonical root before any file is opened.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::PathBuf;
use tokio::fs;

/// Why a file could not be served
#[derive(Debug, PartialEq, Eq)]
pub enum ServeError {
    /// File absent (or not a regular file)
    NotFound,
    /// Resolved path escaped the document root
    Forbidden,
}

/// Serve `GET /`: index.html from the document root
pub async fn serve_index(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    match load_from_root(&state.config.paths.document_root, "index.html").await {
        Ok((content, path)) => {
            http::build_file_response(content, mime::content_type_for(&path), ctx.is_head)
        }
        Err(_) => http::build_404_response(),
    }
}

/// Serve `GET /data`: the canned sensor snapshot, byte for byte.
///
/// The payload is opaque to the server; it is never parsed, so a fixture
/// that is not even valid JSON still round-trips unchanged.
pub async fn serve_fixture(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let fixture = &state.config.paths.fixture_file;
    match fs::read(fixture).await {
        Ok(content) => http::build_json_response(content, ctx.is_head),
        Err(e) => {
            logger::log_warning(&format!("Sensor fixture '{fixture}' unreadable: {e}"));
            http::build_404_response()
        }
    }
}

/// Serve `GET /<path>`: a static asset resolved inside the document root
pub async fn serve_asset(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let relative = ctx.path.trim_start_matches('/');
    if relative.is_empty() {
        return http::build_404_response();
    }

    match load_from_root(&state.config.paths.document_root, relative).await {
        Ok((content, path)) => {
            http::build_file_response(content, mime::content_type_for(&path), ctx.is_head)
        }
        Err(ServeError::Forbidden) => http::build_403_response(),
        Err(ServeError::NotFound) => http::build_404_response(),
    }
}

/// Read a file strictly from within the document root.
///
/// Both the root and the requested path are canonicalized; a resolved path
/// that leaves the root (via `..` segments or symlinks) is refused. Returns
/// the file bytes together with the canonical path for MIME detection.
pub async fn load_from_root(
    document_root: &str,
    relative: &str,
) -> Result<(Vec<u8>, PathBuf), ServeError> {
    let root = match fs::canonicalize(document_root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Document root '{document_root}' not found or inaccessible: {e}"
            ));
            return Err(ServeError::NotFound);
        }
    };

    let requested = root.join(relative);

    // Absent files are common (404), no need to log
    let Ok(canonical) = fs::canonicalize(&requested).await else {
        return Err(ServeError::NotFound);
    };
    if !canonical.starts_with(&root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            relative,
            canonical.display()
        ));
        return Err(ServeError::Forbidden);
    }

    let metadata = fs::metadata(&canonical).await.map_err(|_| ServeError::NotFound)?;
    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    match fs::read(&canonical).await {
        Ok(content) => Ok((content, canonical)),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                canonical.display(),
                e
            ));
            Err(ServeError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HttpConfig, LoggingConfig, PathsConfig, ServerConfig};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Unique scratch directory with a document root and a file outside it
    fn scratch_layout() -> (PathBuf, PathBuf) {
        let id = SCRATCH_COUNTER.fetch_add(1, Ordering::SeqCst);
        let base = std::env::temp_dir().join(format!(
            "sensor-devserver-test-{}-{id}",
            std::process::id()
        ));
        let root = base.join("webroot");
        std::fs::create_dir_all(root.join("js")).unwrap();
        std::fs::write(root.join("index.html"), b"<html>dashboard</html>").unwrap();
        std::fs::write(root.join("js").join("sensor.js"), b"console.log('hi');").unwrap();
        std::fs::write(base.join("secret.txt"), b"outside the root").unwrap();
        (base, root)
    }

    fn test_state(root: &Path, fixture: &Path) -> AppState {
        AppState::new(Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            paths: PathsConfig {
                document_root: root.to_string_lossy().into_owned(),
                fixture_file: fixture.to_string_lossy().into_owned(),
            },
            http: HttpConfig {
                max_body_size: 1024,
            },
            logging: LoggingConfig {
                access_log: false,
                access_log_format: "common".to_string(),
            },
        })
    }

    #[tokio::test]
    async fn test_load_existing_file() {
        let (_base, root) = scratch_layout();
        let (content, path) = load_from_root(root.to_str().unwrap(), "js/sensor.js")
            .await
            .unwrap();
        assert_eq!(content, b"console.log('hi');");
        assert!(path.ends_with("sensor.js"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (_base, root) = scratch_layout();
        let err = load_from_root(root.to_str().unwrap(), "nonexistent.js")
            .await
            .unwrap_err();
        assert_eq!(err, ServeError::NotFound);
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden() {
        let (_base, root) = scratch_layout();
        // The file exists one level above the root, so canonicalization
        // succeeds and only the containment check can refuse it
        let err = load_from_root(root.to_str().unwrap(), "../secret.txt")
            .await
            .unwrap_err();
        assert_eq!(err, ServeError::Forbidden);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_forbidden() {
        let (base, root) = scratch_layout();
        // A link inside the root resolving to a file outside it must be
        // refused just like a literal `..` path
        std::os::unix::fs::symlink(base.join("secret.txt"), root.join("link.txt")).unwrap();
        let err = load_from_root(root.to_str().unwrap(), "link.txt")
            .await
            .unwrap_err();
        assert_eq!(err, ServeError::Forbidden);
    }

    #[tokio::test]
    async fn test_deep_traversal_to_missing_target_is_not_found() {
        let (_base, root) = scratch_layout();
        let err = load_from_root(root.to_str().unwrap(), "../../../../no/such/file")
            .await
            .unwrap_err();
        assert_eq!(err, ServeError::NotFound);
    }

    #[tokio::test]
    async fn test_directory_request_is_not_found() {
        let (_base, root) = scratch_layout();
        let err = load_from_root(root.to_str().unwrap(), "js").await.unwrap_err();
        assert_eq!(err, ServeError::NotFound);
    }

    #[tokio::test]
    async fn test_serve_index_returns_exact_bytes() {
        use http_body_util::BodyExt;

        let (base, root) = scratch_layout();
        let state = test_state(&root, &base.join("missing.json"));
        let ctx = RequestContext {
            path: "/",
            is_head: false,
        };
        let resp = serve_index(&ctx, &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "text/html; charset=utf-8"
        );
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<html>dashboard</html>");
    }

    #[tokio::test]
    async fn test_serve_fixture_streams_file_verbatim() {
        use http_body_util::BodyExt;

        let (base, root) = scratch_layout();
        let fixture = base.join("sensordata.json");
        let payload = br#"{"temperature": 21.4, "humidity": 48}"#;
        std::fs::write(&fixture, payload).unwrap();

        let state = test_state(&root, &fixture);
        let ctx = RequestContext {
            path: "/data",
            is_head: false,
        };
        let resp = serve_fixture(&ctx, &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "application/json"
        );
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], payload);
    }

    #[tokio::test]
    async fn test_serve_fixture_missing_is_404() {
        let (base, root) = scratch_layout();
        let state = test_state(&root, &base.join("missing.json"));
        let ctx = RequestContext {
            path: "/data",
            is_head: false,
        };
        assert_eq!(serve_fixture(&ctx, &state).await.status(), 404);
    }

    #[tokio::test]
    async fn test_serve_asset_status_codes() {
        let (base, root) = scratch_layout();
        let state = test_state(&root, &base.join("missing.json"));

        let ok = RequestContext {
            path: "/js/sensor.js",
            is_head: false,
        };
        assert_eq!(serve_asset(&ok, &state).await.status(), 200);

        let missing = RequestContext {
            path: "/nonexistent.js",
            is_head: false,
        };
        assert_eq!(serve_asset(&missing, &state).await.status(), 404);

        let traversal = RequestContext {
            path: "/../secret.txt",
            is_head: false,
        };
        assert_eq!(serve_asset(&traversal, &state).await.status(), 403);
    }

    #[tokio::test]
    async fn test_head_request_has_empty_body() {
        use http_body_util::BodyExt;

        let (base, root) = scratch_layout();
        let state = test_state(&root, &base.join("missing.json"));
        let ctx = RequestContext {
            path: "/js/sensor.js",
            is_head: true,
        };
        let resp = serve_asset(&ctx, &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers().get("Content-Length").unwrap(), "18");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
