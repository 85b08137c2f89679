//! `multipart/mixed` batch codec.
//!
//! A batch request is one HTTP POST whose body holds one `application/http`
//! part per URL, each part being a complete embedded HTTP request:
//!
//! ```text
//! --BOUNDARY
//! Content-Type: application/http
//! Content-ID: <item-0>
//!
//! POST /v3/urlNotifications:publish HTTP/1.1
//! Content-Type: application/json
//!
//! {"type":"URL_UPDATED","url":"https://example.com/"}
//! --BOUNDARY--
//! ```
//!
//! The response mirrors this shape with embedded HTTP responses whose
//! `Content-ID` is the request's prefixed with `response-`.

use serde::Deserialize;

use super::{SubmissionOutcome, NOTIFICATION_TYPE};
use crate::error::SubmitError;

/// Most sub-requests the service accepts in one batch.
pub const MAX_BATCH_REQUESTS: usize = 1000;

const PUBLISH_PATH: &str = "/v3/urlNotifications:publish";

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// An encoded batch body, ready to POST.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub boundary: String,
    pub body: String,
}

impl BatchRequest {
    /// Encode one publish call per URL under a fresh random boundary.
    pub fn new(urls: &[String]) -> Self {
        let boundary = format!("batch_{}", uuid::Uuid::new_v4().simple());
        Self::with_boundary(urls, boundary)
    }

    pub fn with_boundary(urls: &[String], boundary: impl Into<String>) -> Self {
        let boundary = boundary.into();
        let mut body = String::new();

        for (i, url) in urls.iter().enumerate() {
            let payload = serde_json::json!({ "url": url, "type": NOTIFICATION_TYPE }).to_string();
            body.push_str(&format!(
                "--{boundary}\r\n\
                 Content-Type: application/http\r\n\
                 Content-Transfer-Encoding: binary\r\n\
                 Content-ID: <item-{i}>\r\n\
                 \r\n\
                 POST {PUBLISH_PATH} HTTP/1.1\r\n\
                 Content-Type: application/json\r\n\
                 Accept: application/json\r\n\
                 Content-Length: {len}\r\n\
                 \r\n\
                 {payload}\r\n",
                len = payload.len(),
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        Self { boundary, body }
    }

    /// Value for the outer request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/mixed; boundary={}", self.boundary)
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// One embedded HTTP response from a batch reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartResponse {
    pub content_id: Option<String>,
    pub status: u16,
    pub body: String,
}

/// Split a batch reply into its embedded responses.
///
/// `content_type` is the outer response's header, which carries the
/// boundary.
pub fn decode_response(content_type: &str, body: &str) -> Result<Vec<PartResponse>, SubmitError> {
    let boundary = boundary_param(content_type).ok_or_else(|| {
        SubmitError::MalformedBatch(format!("no boundary in content type {content_type:?}"))
    })?;
    let delimiter = format!("--{boundary}");

    let mut parts = Vec::new();
    // First section is the preamble.
    for section in body.split(delimiter.as_str()).skip(1) {
        if section.starts_with("--") {
            break;
        }
        let section = section.trim_start_matches(['\r', '\n']);
        if section.trim().is_empty() {
            continue;
        }
        parts.push(decode_part(section)?);
    }

    if parts.is_empty() {
        return Err(SubmitError::MalformedBatch(
            "reply contains no parts".to_string(),
        ));
    }
    Ok(parts)
}

/// Match embedded responses back to the URLs of the request that produced
/// them.
///
/// Parts are matched by `Content-ID`, falling back to position when the ID
/// is missing or unrecognized.  Exactly one outcome is produced per URL.
pub fn outcomes(urls: &[String], parts: Vec<PartResponse>) -> Vec<SubmissionOutcome> {
    let mut slots: Vec<Option<PartResponse>> = vec![None; urls.len()];

    for (position, part) in parts.into_iter().enumerate() {
        let index = part
            .content_id
            .as_deref()
            .and_then(item_index)
            .unwrap_or(position);
        match slots.get_mut(index) {
            Some(slot) if slot.is_none() => *slot = Some(part),
            Some(_) => tracing::warn!("Duplicate batch response for item {index}"),
            None => tracing::warn!("Batch response for unknown item {index}"),
        }
    }

    urls.iter()
        .zip(slots)
        .map(|(url, slot)| match slot {
            None => SubmissionOutcome::rejected(url, "no response for this URL in batch reply"),
            Some(part) => part_outcome(url, &part),
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    url_notification_metadata: Option<NotificationMetadata>,
}

#[derive(Deserialize)]
struct NotificationMetadata {
    url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn part_outcome(url: &str, part: &PartResponse) -> SubmissionOutcome {
    if !(200..300).contains(&part.status) {
        let reason = match serde_json::from_str::<ErrorResponse>(&part.body) {
            Ok(e) => format!("{}: {}", part.status, e.error.message),
            Err(_) if part.body.is_empty() => format!("HTTP {}", part.status),
            Err(_) => format!("HTTP {}: {}", part.status, part.body),
        };
        return SubmissionOutcome::rejected(url, reason);
    }

    let confirmed = serde_json::from_str::<PublishResponse>(&part.body)
        .ok()
        .and_then(|r| r.url_notification_metadata)
        .and_then(|m| m.url);
    match confirmed {
        Some(confirmed) => SubmissionOutcome::accepted(url, confirmed),
        None => SubmissionOutcome::rejected(url, "response has no urlNotificationMetadata.url"),
    }
}

fn decode_part(section: &str) -> Result<PartResponse, SubmitError> {
    let (outer_head, inner) = split_head(section)
        .ok_or_else(|| SubmitError::MalformedBatch("part without header block".to_string()))?;
    let content_id = header_value(outer_head, "content-id");

    let (inner_head, body) = split_head(inner).unwrap_or((inner, ""));
    let status_line = inner_head.lines().next().unwrap_or_default();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| SubmitError::MalformedBatch(format!("bad status line {status_line:?}")))?;

    Ok(PartResponse {
        content_id,
        status,
        body: body.trim().to_string(),
    })
}

/// Split at the first blank line, accepting either CRLF or bare LF.
fn split_head(s: &str) -> Option<(&str, &str)> {
    let crlf = s.find("\r\n\r\n").map(|i| (i, 4));
    let lf = s.find("\n\n").map(|i| (i, 2));
    let (at, len) = match (crlf, lf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (a, b) => a.or(b)?,
    };
    Some((&s[..at], &s[at + len..]))
}

fn header_value(head: &str, name: &str) -> Option<String> {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
        .map(|(_, v)| v.trim().to_string())
}

fn boundary_param(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// `<response-item-3>` → 3
fn item_index(content_id: &str) -> Option<usize> {
    let id = content_id.trim().trim_start_matches('<').trim_end_matches('>');
    let id = id.strip_prefix("response-").unwrap_or(id);
    id.strip_prefix("item-")?.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
