//! Uniform outcome of every REST call.
//!
//! A call either produced a 2xx reply ([`RestResponse`]) or failed in one of
//! three ways ([`RequestError`]): it never left the process because the site
//! is misconfigured, it never got a reply, or WordPress answered with a
//! non-2xx status.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of a single REST call.
pub type RequestResult = std::result::Result<RestResponse, RequestError>;

/// Lower-cased response header name to value.
pub type Headers = BTreeMap<String, String>;

/// An HTTP reply from WordPress.
#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    pub status: u16,
    pub raw_body: Option<String>,
    /// Parsed JSON body; `None` when the body is empty or not JSON.
    pub body: Option<Value>,
    /// Only populated for GET requests.
    pub headers: Headers,
}

impl RestResponse {
    /// Build a response from a raw status and body, parsing JSON leniently.
    pub fn new(status: u16, raw_body: String, headers: Headers) -> Self {
        let body = if raw_body.is_empty() {
            None
        } else {
            serde_json::from_str(&raw_body).ok()
        };
        Self {
            status,
            raw_body: Some(raw_body),
            body,
            headers,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `body.id` of a created or fetched resource.
    pub fn id(&self) -> Option<i64> {
        self.body.as_ref()?.get("id")?.as_i64()
    }

    /// `body.link`, or `body.source_url` for media items.
    pub fn link(&self) -> Option<&str> {
        let body = self.body.as_ref()?;
        body.get("link")
            .and_then(Value::as_str)
            .or_else(|| body.get("source_url").and_then(Value::as_str))
    }

    /// `body.message` as returned by WordPress on errors.
    pub fn message(&self) -> Option<&str> {
        self.body.as_ref()?.get("message")?.as_str()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// `X-WP-Total` of a list call.
    pub fn total(&self) -> Option<u64> {
        self.header("x-wp-total")?.trim().parse().ok()
    }

    /// `X-WP-TotalPages` of a list call.
    pub fn total_pages(&self) -> Option<u64> {
        self.header("x-wp-totalpages")?.trim().parse().ok()
    }

    /// The body as a list of items, empty when it is not an array.
    pub fn items(&self) -> &[Value] {
        match &self.body {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }
}

/// A REST call that did not succeed.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestError {
    /// Required endpoint or credential missing; nothing was sent.
    Config(String),

    /// DNS, connect, TLS or timeout failure; no reply was received.
    Transport(String),

    /// WordPress answered with a status outside 2xx.
    Http(RestResponse),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Config(message) | RequestError::Transport(message) => {
                write!(f, "{message}")
            }
            RequestError::Http(response) => match response.message() {
                Some(message) => write!(f, "HTTP {}: {}", response.status, message),
                None => write!(f, "HTTP {}", response.status),
            },
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    /// Synthetic failure for a call rejected before reaching the network.
    pub fn config(message: impl Into<String>) -> Self {
        RequestError::Config(message.into())
    }

    /// Status code of the reply, or 0 when no reply was received.
    pub fn http_status(&self) -> u16 {
        match self {
            RequestError::Http(response) => response.status,
            _ => 0,
        }
    }

    pub fn transport_error(&self) -> Option<&str> {
        match self {
            RequestError::Config(message) | RequestError::Transport(message) => Some(message),
            RequestError::Http(_) => None,
        }
    }

    pub fn response(&self) -> Option<&RestResponse> {
        match self {
            RequestError::Http(response) => Some(response),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        self.response()?.body.as_ref()
    }

    pub fn raw_body(&self) -> Option<&str> {
        self.response()?.raw_body.as_deref()
    }

    /// Only populated for GET requests.
    pub fn headers(&self) -> Option<&Headers> {
        self.response().map(|response| &response.headers)
    }
}

pub fn is_success(result: &RequestResult) -> bool {
    result.is_ok()
}

/// Human readable failure description: `HTTP <code> | <transport> | <message>`.
pub fn error_message(result: &RequestResult) -> String {
    let error = match result {
        Ok(_) => return "Unknown error".to_string(),
        Err(error) => error,
    };

    let mut parts = Vec::new();
    let status = error.http_status();
    if status >= 400 {
        parts.push(format!("HTTP {}", status));
    }
    if let Some(message) = error.transport_error().filter(|m| !m.is_empty()) {
        parts.push(message.to_string());
    }
    if let Some(message) = error
        .response()
        .and_then(RestResponse::message)
        .filter(|m| !m.is_empty())
    {
        parts.push(message.to_string());
    }

    if parts.is_empty() {
        "Unknown error".to_string()
    } else {
        parts.join(" | ")
    }
}

/// The WordPress reply of a call, successful or not.
fn reply_of(result: &RequestResult) -> Option<&RestResponse> {
    match result {
        Ok(response) => Some(response),
        Err(error) => error.response(),
    }
}

/// `body.id` of the reply, read from error replies as well.
pub fn created_id(result: &RequestResult) -> Option<i64> {
    reply_of(result)?.id()
}

/// `body.link` or `body.source_url` of the reply, read from error replies as well.
pub fn created_link(result: &RequestResult) -> Option<&str> {
    reply_of(result)?.link()
}
