//! Form body parsing module
//!
//! Decodes POST bodies into a field-name → value mapping. Supports
//! `application/x-www-form-urlencoded` and `multipart/form-data`. The
//! multipart parser is deliberately tolerant: malformed parts are skipped
//! instead of failing the whole request, and file uploads (parts carrying a
//! `filename` parameter) never contribute a field.

use std::collections::BTreeMap;

/// Parsed form fields, ordered by key for deterministic JSON output
pub type FormFields = BTreeMap<String, String>;

/// Form parsing failures that map to 400 Bad Request
#[derive(Debug, PartialEq, Eq)]
pub enum FormError {
    /// Content-Type is neither urlencoded nor multipart
    UnsupportedContentType(String),
    /// multipart/form-data without a boundary parameter
    MissingBoundary,
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedContentType(ct) => write!(f, "unsupported content type '{ct}'"),
            Self::MissingBoundary => write!(f, "multipart body without boundary parameter"),
        }
    }
}

/// Parse a POST body according to its Content-Type.
///
/// An empty body always yields an empty mapping, whatever the declared type.
/// A missing Content-Type header is treated as urlencoded, which is what
/// command-line clients send when posting `key=value` data without headers.
pub fn parse_form_body(body: &[u8], content_type: Option<&str>) -> Result<FormFields, FormError> {
    if body.is_empty() {
        return Ok(FormFields::new());
    }

    let Some(content_type) = content_type else {
        return Ok(parse_urlencoded(body));
    };

    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match media_type.as_str() {
        "application/x-www-form-urlencoded" => Ok(parse_urlencoded(body)),
        "multipart/form-data" => {
            let boundary = boundary_from_content_type(content_type).ok_or(FormError::MissingBoundary)?;
            Ok(parse_multipart(body, &boundary))
        }
        _ => Err(FormError::UnsupportedContentType(media_type)),
    }
}

/// Decode an urlencoded body (percent sequences and `+` for space)
pub fn parse_urlencoded(body: &[u8]) -> FormFields {
    url::form_urlencoded::parse(body).into_owned().collect()
}

/// Extract the boundary parameter from a multipart Content-Type value
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    for param in content_type.split(';').skip(1) {
        let Some((key, value)) = param.trim().split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("boundary") {
            let value = value.trim().trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Parse a multipart/form-data body into its non-file fields.
///
/// Parts are framed by `--boundary` lines per RFC 7578. Parts without a
/// usable Content-Disposition header, and parts that declare a filename,
/// are skipped.
pub fn parse_multipart(body: &[u8], boundary: &str) -> FormFields {
    let mut fields = FormFields::new();

    // Separator between parts; the very first boundary line has no leading CRLF
    let sep = [b"\r\n--".as_slice(), boundary.as_bytes()].concat();
    let first = [b"--".as_slice(), boundary.as_bytes()].concat();

    let mut cursor = if body.starts_with(&first) {
        first.len()
    } else {
        match find_subsequence(body, &sep) {
            Some(i) => i + sep.len(),
            None => return fields,
        }
    };

    loop {
        // "--" after the boundary marks the closing delimiter
        if body[cursor..].starts_with(b"--") {
            break;
        }
        // Boundary line ends with CRLF (tolerate bare LF)
        if body[cursor..].starts_with(b"\r\n") {
            cursor += 2;
        } else if body[cursor..].starts_with(b"\n") {
            cursor += 1;
        } else {
            break;
        }

        let Some(rel_end) = find_subsequence(&body[cursor..], &sep) else {
            break; // unterminated part
        };
        parse_part(&body[cursor..cursor + rel_end], &mut fields);
        cursor += rel_end + sep.len();
    }

    fields
}

/// Parse one part (headers + payload) and record it if it is a plain field
fn parse_part(part: &[u8], fields: &mut FormFields) {
    let (headers, payload) = match find_subsequence(part, b"\r\n\r\n") {
        Some(i) => (&part[..i], &part[i + 4..]),
        None => match find_subsequence(part, b"\n\n") {
            Some(i) => (&part[..i], &part[i + 2..]),
            None => return,
        },
    };

    let headers = String::from_utf8_lossy(headers);
    let disposition = headers.lines().find(|line| {
        line.get(..20)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("content-disposition:"))
    });
    let Some(disposition) = disposition else {
        return;
    };

    // File uploads belong to a files collection, not the field mapping
    if disposition_param(disposition, "filename").is_some() {
        return;
    }
    let Some(name) = disposition_param(disposition, "name") else {
        return;
    };

    fields.insert(name, String::from_utf8_lossy(payload).into_owned());
}

/// Extract a `key="value"` (or unquoted `key=value`) parameter from a
/// Content-Disposition header line
fn disposition_param(line: &str, key: &str) -> Option<String> {
    for param in line.split(';').skip(1) {
        let Some((k, v)) = param.trim().split_once('=') else {
            continue;
        };
        if k.trim().eq_ignore_ascii_case(key) {
            return Some(v.trim().trim_matches('"').to_string());
        }
    }
    None
}

/// First occurrence of `needle` in `haystack`
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
