//! HTTP plumbing underneath [`crate::RestClient`].
//!
//! Requests and replies are plain data. `RestClient` builds an [`HttpRequest`],
//! an [`HttpSend`] implementation performs the round-trip, and the reply comes
//! back as an [`HttpReply`]. Production code uses [`ReqwestSender`]; tests
//! substitute a fake sender and inspect what would have gone over the wire.

use crate::error::{Error, Result};
use crate::upload::FileUpload;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// HTTP methods used against the WordPress REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(Error::InvalidInput(format!("Unsupported HTTP method: {}", other))),
        }
    }
}

/// Which timeout pair applies to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutProfile {
    Json,
    Upload,
}

/// Connect and total timeouts for both request profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub total: Duration,
    pub upload_connect: Duration,
    pub upload_total: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            total: Duration::from_secs(30),
            upload_connect: Duration::from_secs(15),
            upload_total: Duration::from_secs(60),
        }
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(String),
    /// Text fields followed by a `file` part read from disk at send time.
    Multipart {
        fields: Vec<(String, String)>,
        file: FileUpload,
    },
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub verify_ssl: bool,
    pub profile: TimeoutProfile,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            verify_ssl: true,
            profile: TimeoutProfile::Json,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn profile(mut self, profile: TimeoutProfile) -> Self {
        self.profile = profile;
        self
    }

    /// First header value with this name, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP reply described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Performs the network round-trip for a request.
///
/// An `Err` means no reply was received at all; any reply, whatever its
/// status, is `Ok`.
#[async_trait]
pub trait HttpSend: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply>;
}

/// Clients with and without certificate verification for one timeout profile
struct ClientPair {
    verified: Client,
    unverified: Client,
}

impl ClientPair {
    fn build(connect: Duration, total: Duration) -> Result<Self> {
        let verified = Client::builder()
            .connect_timeout(connect)
            .timeout(total)
            .build()?;

        // With rustls this also skips hostname verification.
        let unverified = Client::builder()
            .connect_timeout(connect)
            .timeout(total)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            verified,
            unverified,
        })
    }

    fn pick(&self, verify_ssl: bool) -> &Client {
        if verify_ssl {
            &self.verified
        } else {
            &self.unverified
        }
    }
}

/// [`HttpSend`] backed by `reqwest`
pub struct ReqwestSender {
    json: ClientPair,
    upload: ClientPair,
}

impl ReqwestSender {
    pub fn new(timeouts: Timeouts) -> Result<Self> {
        Ok(Self {
            json: ClientPair::build(timeouts.connect, timeouts.total)?,
            upload: ClientPair::build(timeouts.upload_connect, timeouts.upload_total)?,
        })
    }

    fn client_for(&self, request: &HttpRequest) -> &Client {
        match request.profile {
            TimeoutProfile::Json => self.json.pick(request.verify_ssl),
            TimeoutProfile::Upload => self.upload.pick(request.verify_ssl),
        }
    }
}

#[async_trait]
impl HttpSend for ReqwestSender {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        let mut builder = self.client_for(&request).request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(payload) => builder.body(payload),
            RequestBody::Multipart { fields, file } => {
                let bytes = tokio::fs::read(&file.path).await?;
                let part = Part::bytes(bytes)
                    .file_name(file.name.clone())
                    .mime_str(&file.mime)?;

                let mut form = Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                builder.multipart(form.part("file", part))
            }
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpReply {
            status,
            headers,
            body,
        })
    }
}
