//! Host-neutral HTTP request and reply types.
//!
//! The plugin never opens sockets itself: it describes a request, the host
//! performs it, and the reply comes back as an event. These types are that
//! description, kept free of Zellij types so they can be built and inspected
//! in tests.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::domain::{HirafiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A request for the host to perform.
///
/// `Debug` output redacts credential headers.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    /// Opaque routing data the host hands back with the reply.
    pub context: BTreeMap<String, String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: BTreeMap::new(),
            body: Vec::new(),
            context: BTreeMap::new(),
        }
    }

    /// Builds a POST with a JSON body and the matching content type.
    pub fn post_json(url: impl Into<String>, body: &Value) -> Result<Self> {
        let mut request = Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: BTreeMap::new(),
            body: serde_json::to_vec(body)?,
            context: BTreeMap::new(),
        };
        request
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(request)
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    /// Host part of the URL, for logging without the path or query.
    #[must_use]
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }

    #[must_use]
    pub fn with_context(mut self, context: BTreeMap<String, String>) -> Self {
        self.context = context;
        self
    }
}

/// Headers whose values are credentials.
const SECRET_HEADERS: [&str; 3] = ["authorization", "apikey", "x-goog-api-key"];

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let secret = SECRET_HEADERS.contains(&name.to_ascii_lowercase().as_str());
                (name.as_str(), if secret { "<redacted>" } else { value.as_str() })
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body_len", &self.body.len())
            .field("context", &self.context)
            .finish()
    }
}

/// True for 2xx statuses.
#[must_use]
pub const fn is_success(status: u16) -> bool {
    status >= 200 && status < 300
}

/// Maps a non-success reply to [`HirafiError::Remote`].
///
/// Stores answer errors as JSON objects with a `message` field; that message
/// is used when present, otherwise a compact preview of the raw body.
#[must_use]
pub fn map_status_error(status: u16, body: &[u8]) -> HirafiError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.pointer("/error/message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body_preview(body));

    if message.is_empty() {
        HirafiError::remote(status, format!("status {status}"))
    } else {
        HirafiError::remote(status, message)
    }
}

/// Whitespace-compacted, length-capped rendering of a reply body.
#[must_use]
pub fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
